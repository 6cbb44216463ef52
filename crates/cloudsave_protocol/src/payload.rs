//! Multi-file wire payload.

use crate::error::{ProtocolError, ProtocolResult};
use cloudsave_codec::decode_value;
use cloudsave_storage::{ExpectedFileSet, SaveRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A save record as sent over JSON: logical filename to wire value.
///
/// Binary files travel as base64 data URIs; text fields travel as plain
/// strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteSavePayload {
    files: BTreeMap<String, Value>,
}

impl RemoteSavePayload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes every expected file of `record`.
    ///
    /// Files outside the expected set are not sent. An expected file absent
    /// from the record is omitted.
    pub fn from_record(record: &SaveRecord, expected: &ExpectedFileSet) -> Self {
        let files = expected
            .iter()
            .filter_map(|name| {
                record
                    .get(name)
                    .map(|contents| (name.to_string(), Value::String(contents.to_wire_string())))
            })
            .collect();
        Self { files }
    }

    /// Encodes every file present in `record`.
    pub fn from_entries(record: &SaveRecord) -> Self {
        let files = record
            .files
            .iter()
            .map(|(name, contents)| (name.clone(), Value::String(contents.to_wire_string())))
            .collect();
        Self { files }
    }

    /// Parses the `data` field of a multi-file load response.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Shape`] if `data` is not a JSON object.
    pub fn from_value(data: Value) -> ProtocolResult<Self> {
        match data {
            Value::Object(map) => Ok(Self {
                files: map.into_iter().collect(),
            }),
            other => Err(ProtocolError::Shape(format!(
                "expected a file map, got {}",
                kind(&other)
            ))),
        }
    }

    /// Builds the complete record for `expected`.
    ///
    /// Every expected file is decoded; a file the payload does not supply
    /// becomes an empty buffer. Entries outside the expected set are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Codec`] if a supplied value cannot be decoded.
    pub fn to_record(&self, expected: &ExpectedFileSet) -> ProtocolResult<SaveRecord> {
        let mut record = SaveRecord::new();
        for name in expected.iter() {
            let contents =
                decode_value(self.files.get(name)).map_err(|e| ProtocolError::codec(name, e))?;
            record.insert(name, contents);
        }
        Ok(record)
    }

    /// Inserts a raw wire value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.files.insert(name.into(), value);
    }

    /// Returns the wire value of a file.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.files.get(name)
    }

    /// Iterates over the files.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the payload carries no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
