//! In-memory store for testing.

use crate::backend::StoreBackend;
use crate::error::{StorageError, StorageResult};
use crate::record::SaveRecord;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// An in-memory record store.
///
/// Clones share the same records, so a test can keep one clone for
/// inspection while handing another to the sync engine. Switches simulate
/// an unavailable store and failing writes.
///
/// # Example
///
/// ```rust
/// use cloudsave_storage::{InMemoryStore, SaveRecord, StoreBackend};
///
/// let store = InMemoryStore::new();
/// store.put("timestamp", &SaveRecord::new().with_file("file0", vec![1u8])).unwrap();
/// assert_eq!(store.keys().unwrap(), vec!["timestamp".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    records: RwLock<HashMap<String, SaveRecord>>,
    available: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                records: RwLock::new(HashMap::new()),
                available: AtomicBool::new(true),
                fail_writes: AtomicBool::new(false),
                writes: AtomicU64::new(0),
            }),
        }
    }

    /// Seeds a record without counting it as a write.
    #[must_use]
    pub fn with_record(self, key: impl Into<String>, record: SaveRecord) -> Self {
        self.inner.records.write().insert(key.into(), record);
        self
    }

    /// Makes the store report itself as unavailable.
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// Makes every subsequent `put` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Returns a copy of the record under `key`, bypassing availability.
    #[must_use]
    pub fn snapshot(&self, key: &str) -> Option<SaveRecord> {
        self.inner.records.read().get(key).cloned()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for InMemoryStore {
    fn check_available(&self) -> StorageResult<()> {
        if self.inner.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::unavailable("in-memory store disabled"))
        }
    }

    fn get(&self, key: &str) -> StorageResult<Option<SaveRecord>> {
        self.check_available()?;
        Ok(self.inner.records.read().get(key).cloned())
    }

    fn put(&self, key: &str, record: &SaveRecord) -> StorageResult<()> {
        self.check_available()?;
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::write_failed("in-memory writes disabled"));
        }
        self.inner
            .records
            .write()
            .insert(key.to_string(), record.clone());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.check_available()?;
        let mut keys: Vec<String> = self.inner.records.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
