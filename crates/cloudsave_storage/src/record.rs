//! Save records and the per-game set of expected files.

use chrono::{DateTime, Utc};
use cloudsave_codec::FileContents;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The fixed list of logical filenames a game's save state must contain.
///
/// Order is preserved; duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpectedFileSet {
    names: Vec<String>,
}

impl ExpectedFileSet {
    /// Creates a set from a list of names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for name in names {
            let name = name.into();
            if !set.contains(&name) {
                set.names.push(name);
            }
        }
        set
    }

    /// Iterates over the names in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns true if `name` is expected.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Number of expected files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no files are expected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A named collection of save files plus metadata.
///
/// Keys are stable logical filenames. An empty buffer stands for a file the
/// game has not written yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveRecord {
    /// File contents by logical name.
    #[serde(default)]
    pub files: BTreeMap<String, FileContents>,
    /// Last-modified time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// POSIX mode bits as stored by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

impl SaveRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, builder style.
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<FileContents>) -> Self {
        self.insert(name, contents);
        self
    }

    /// Inserts or replaces a file.
    pub fn insert(&mut self, name: impl Into<String>, contents: impl Into<FileContents>) {
        self.files.insert(name.into(), contents.into());
    }

    /// Returns the contents of a file.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FileContents> {
        self.files.get(name)
    }

    /// Number of files in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the record holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns true if at least one expected file has content.
    #[must_use]
    pub fn has_content(&self, expected: &ExpectedFileSet) -> bool {
        expected
            .iter()
            .any(|name| self.files.get(name).is_some_and(|c| !c.is_empty()))
    }

    /// Names of expected files that are absent from the record.
    #[must_use]
    pub fn missing<'a>(&self, expected: &'a ExpectedFileSet) -> Vec<&'a str> {
        expected
            .iter()
            .filter(|name| !self.files.contains_key(*name))
            .collect()
    }

    /// Inserts an empty buffer for every absent expected file.
    ///
    /// Returns the number of files added.
    pub fn fill_missing(&mut self, expected: &ExpectedFileSet) -> usize {
        let mut added = 0;
        for name in expected.iter() {
            if !self.files.contains_key(name) {
                self.files.insert(name.to_string(), FileContents::empty());
                added += 1;
            }
        }
        added
    }
}
