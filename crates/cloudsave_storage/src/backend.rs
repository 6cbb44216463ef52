//! Store backend trait definition.

use crate::error::StorageResult;
use crate::record::SaveRecord;

/// A local record store.
///
/// Backends store whole [`SaveRecord`]s by string key and know nothing about
/// expected files or synchronization. Callers go through
/// [`crate::StoreHandle`], which adds repair-on-read and scoping.
///
/// # Invariants
///
/// - `put` replaces the record atomically: a concurrent `get` observes
///   either the previous record or the new one
/// - `get` returns exactly the record last `put` under that key
/// - Backends must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait StoreBackend: Send + Sync {
    /// Checks that the store and its record container are accessible.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::Unavailable`] otherwise.
    fn check_available(&self) -> StorageResult<()>;

    /// Reads the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or is corrupted.
    fn get(&self, key: &str) -> StorageResult<Option<SaveRecord>>;

    /// Replaces the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::WriteFailed`] if the record could not
    /// be persisted.
    fn put(&self, key: &str, record: &SaveRecord) -> StorageResult<()>;

    /// Lists all keys in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Returns the most recently modified record.
    ///
    /// Records without a timestamp sort before every timestamped one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn latest(&self) -> StorageResult<Option<(String, SaveRecord)>> {
        let mut records = Vec::new();
        for key in self.keys()? {
            if let Some(record) = self.get(&key)? {
                records.push((key, record));
            }
        }
        Ok(newest(records))
    }
}

/// Picks the record with the greatest `modified` time.
///
/// On a tie the record listed last wins.
pub(crate) fn newest<I>(records: I) -> Option<(String, SaveRecord)>
where
    I: IntoIterator<Item = (String, SaveRecord)>,
{
    let mut latest: Option<(String, SaveRecord)> = None;
    for (key, record) in records {
        let newer = latest
            .as_ref()
            .map_or(true, |(_, best)| record.modified >= best.modified);
        if newer {
            latest = Some((key, record));
        }
    }
    latest
}
