//! Test fixtures and store helpers.

use cloudsave_storage::{ExpectedFileSet, FileStore, OpenOptions, SaveRecord};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A file store in a temporary directory, removed on drop.
pub struct TestStore {
    /// The store, shareable with an engine.
    pub store: Arc<FileStore>,
    /// The temporary root (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestStore {
    /// Creates the store for `store_name` under a fresh temporary root.
    pub fn new(store_name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open_named(temp_dir.path(), store_name, OpenOptions::create())
            .expect("Failed to create file store");
        Self {
            store: Arc::new(store),
            _temp_dir: temp_dir,
        }
    }

    /// Returns the temporary root holding the store directory.
    pub fn root(&self) -> &Path {
        self._temp_dir.path()
    }
}

impl std::ops::Deref for TestStore {
    type Target = FileStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary file store.
///
/// # Example
///
/// ```rust,ignore
/// use cloudsave_testkit::with_temp_store;
///
/// #[test]
/// fn my_test() {
///     with_temp_store("/userfs", |store| {
///         assert!(store.keys().unwrap().is_empty());
///     });
/// }
/// ```
pub fn with_temp_store<F, R>(store_name: &str, f: F) -> R
where
    F: FnOnce(&FileStore) -> R,
{
    let store = TestStore::new(store_name);
    f(&store)
}

/// A record holding every expected file: `files` as given, the rest empty.
pub fn complete_record(expected: &ExpectedFileSet, files: &[(&str, &[u8])]) -> SaveRecord {
    let mut record = SaveRecord::new();
    for (name, bytes) in files {
        record.insert(*name, bytes.to_vec());
    }
    record.fill_missing(expected);
    record
}

/// A record holding every expected file, all empty.
pub fn blank_record(expected: &ExpectedFileSet) -> SaveRecord {
    complete_record(expected, &[])
}
