//! Scoped access to a local store.

use crate::backend::StoreBackend;
use crate::error::{StorageError, StorageResult};
use crate::record::{ExpectedFileSet, SaveRecord};
use chrono::Utc;
use std::sync::Arc;

/// The local store adapter for one game.
///
/// Holds the backend and the game's expected files. Each sync pass calls
/// [`LocalStore::open`] and works through the returned [`StoreHandle`].
pub struct LocalStore<B: StoreBackend> {
    backend: Arc<B>,
    expected: ExpectedFileSet,
}

impl<B: StoreBackend> LocalStore<B> {
    /// Creates an adapter over `backend`.
    pub fn new(backend: Arc<B>, expected: ExpectedFileSet) -> Self {
        Self { backend, expected }
    }

    /// Returns the expected files.
    pub fn expected(&self) -> &ExpectedFileSet {
        &self.expected
    }

    /// Returns the backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Opens a handle.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the backend is not
    /// accessible.
    pub fn open(&self) -> StorageResult<StoreHandle<B>> {
        self.backend.check_available()?;
        tracing::trace!("store handle opened");
        Ok(StoreHandle {
            backend: Arc::clone(&self.backend),
            expected: self.expected.clone(),
            open: true,
        })
    }
}

impl<B: StoreBackend> Clone for LocalStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            expected: self.expected.clone(),
        }
    }
}

/// An open handle on a local store.
///
/// Closed explicitly with [`StoreHandle::close`] or on drop, whichever
/// comes first. Operations on a closed handle fail with
/// [`StorageError::Closed`].
pub struct StoreHandle<B: StoreBackend> {
    backend: Arc<B>,
    expected: ExpectedFileSet,
    open: bool,
}

impl<B: StoreBackend> StoreHandle<B> {
    /// Reads the record under `key`, repairing it if needed.
    ///
    /// A missing record reads as empty. Every expected file absent from the
    /// record is filled with an empty buffer and the repaired record is
    /// written back before it is returned. If that write fails the failure
    /// is logged and the repaired record is still returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the store cannot be read.
    pub fn read(&self, key: &str) -> StorageResult<SaveRecord> {
        self.ensure_open()?;

        let mut record = self.backend.get(key)?.unwrap_or_default();
        let added = record.fill_missing(&self.expected);
        if added > 0 {
            stamp(&mut record);
            match self.backend.put(key, &record) {
                Ok(()) => tracing::debug!(key, added, "initialized missing save files"),
                Err(e) => tracing::error!(key, error = %e, "failed to write initial save files"),
            }
        }

        Ok(record)
    }

    /// Reads the record under `key` as stored, without repair.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the store cannot be read.
    pub fn get(&self, key: &str) -> StorageResult<Option<SaveRecord>> {
        self.ensure_open()?;
        self.backend.get(key)
    }

    /// Replaces the record under `key`.
    ///
    /// A record without a timestamp is stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::WriteFailed`] if the record could not be
    /// persisted, or [`StorageError::Closed`].
    pub fn write(&self, key: &str, record: &SaveRecord) -> StorageResult<()> {
        self.ensure_open()?;

        if record.modified.is_some() {
            self.backend.put(key, record)
        } else {
            let mut stamped = record.clone();
            stamp(&mut stamped);
            self.backend.put(key, &stamped)
        }
    }

    /// Lists every key in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the store cannot be read.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        self.ensure_open()?;
        self.backend.keys()
    }

    /// Returns the most recently written record.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the store cannot be read.
    pub fn latest(&self) -> StorageResult<Option<(String, SaveRecord)>> {
        self.ensure_open()?;
        self.backend.latest()
    }

    /// Returns true until the handle is closed.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Releases the handle. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.open {
            self.open = false;
            tracing::trace!("store handle closed");
        }
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(StorageError::Closed)
        }
    }
}

impl<B: StoreBackend> Drop for StoreHandle<B> {
    fn drop(&mut self) {
        self.close();
    }
}

fn stamp(record: &mut SaveRecord) {
    if record.modified.is_none() {
        record.modified = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use cloudsave_codec::FileContents;
    use proptest::prelude::*;

    const NAMES: [&str; 7] = [
        "file0",
        "file8",
        "file9",
        "config.ini",
        "undertale.ini",
        "trophies.ini",
        "decomp_vars.ini",
    ];

    fn local(store: &InMemoryStore) -> LocalStore<InMemoryStore> {
        LocalStore::new(Arc::new(store.clone()), ExpectedFileSet::new(NAMES))
    }

    #[test]
    fn read_missing_record_creates_placeholders() {
        let store = InMemoryStore::new();
        let handle = local(&store).open().unwrap();

        let record = handle.read("timestamp").unwrap();
        assert_eq!(record.len(), NAMES.len());
        assert!(record.files.values().all(FileContents::is_empty));
        assert!(record.modified.is_some());

        assert_eq!(store.snapshot("timestamp"), Some(record));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn complete_record_is_not_rewritten() {
        let mut seeded = SaveRecord::new();
        seeded.fill_missing(&ExpectedFileSet::new(NAMES));
        let store = InMemoryStore::new().with_record("timestamp", seeded.clone());

        let handle = local(&store).open().unwrap();
        assert_eq!(handle.read("timestamp").unwrap(), seeded);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn failed_repair_still_returns_repaired_record() {
        let store = InMemoryStore::new()
            .with_record("timestamp", SaveRecord::new().with_file("file0", vec![5u8]));
        store.set_fail_writes(true);

        let handle = local(&store).open().unwrap();
        let record = handle.read("timestamp").unwrap();
        assert!(record.missing(&ExpectedFileSet::new(NAMES)).is_empty());
        assert_eq!(store.snapshot("timestamp").unwrap().len(), 1);
    }

    #[test]
    fn get_does_not_repair() {
        let store = InMemoryStore::new();
        let handle = local(&store).open().unwrap();

        assert_eq!(handle.get("timestamp").unwrap(), None);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn open_unavailable_store_fails() {
        let store = InMemoryStore::new();
        store.set_available(false);
        assert!(matches!(local(&store).open(), Err(StorageError::Unavailable(_))));
    }

    #[test]
    fn write_stamps_missing_timestamp() {
        let store = InMemoryStore::new();
        let handle = local(&store).open().unwrap();

        handle
            .write("timestamp", &SaveRecord::new().with_file("file0", vec![1u8]))
            .unwrap();
        assert!(store.snapshot("timestamp").unwrap().modified.is_some());
    }

    #[test]
    fn write_failure_is_reported() {
        let store = InMemoryStore::new();
        store.set_fail_writes(true);
        let handle = local(&store).open().unwrap();

        let result = handle.write("timestamp", &SaveRecord::new());
        assert!(matches!(result, Err(StorageError::WriteFailed(_))));
    }

    #[test]
    fn close_is_idempotent() {
        let store = InMemoryStore::new();
        let mut handle = local(&store).open().unwrap();

        handle.close();
        handle.close();
        assert!(!handle.is_open());
        assert!(matches!(handle.read("timestamp"), Err(StorageError::Closed)));
        assert!(matches!(
            handle.write("timestamp", &SaveRecord::new()),
            Err(StorageError::Closed)
        ));
    }

    proptest! {
        #[test]
        fn repair_is_complete_and_idempotent(
            present in prop::collection::vec(any::<bool>(), NAMES.len()),
            contents in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), NAMES.len()),
        ) {
            let mut seeded = SaveRecord::new();
            for ((name, keep), bytes) in NAMES.iter().zip(&present).zip(&contents) {
                if *keep {
                    seeded.insert(*name, bytes.clone());
                }
            }
            let store = InMemoryStore::new().with_record("timestamp", seeded.clone());
            let handle = local(&store).open().unwrap();

            let first = handle.read("timestamp").unwrap();
            for name in NAMES {
                prop_assert!(first.get(name).is_some());
            }
            for (name, contents) in &seeded.files {
                prop_assert_eq!(first.get(name), Some(contents));
            }

            let second = handle.read("timestamp").unwrap();
            prop_assert_eq!(&first, &second);
        }
    }
}
