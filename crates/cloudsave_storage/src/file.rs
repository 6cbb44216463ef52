//! File-based record store.

use crate::backend::{newest, StoreBackend};
use crate::error::{StorageError, StorageResult};
use crate::record::SaveRecord;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions as FsOpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the record container inside a store directory.
pub const CONTAINER_FILE: &str = "FILE_DATA.json";
/// Temporary file for atomic container writes.
const CONTAINER_TEMP: &str = "FILE_DATA.json.tmp";
/// Advisory lock file serializing readers and writers.
const LOCK_FILE: &str = "LOCK";

/// Options for opening a [`FileStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Create the store directory and an empty container if missing.
    pub create_if_missing: bool,
}

impl OpenOptions {
    /// Options that fail when the store does not exist yet.
    #[must_use]
    pub fn existing() -> Self {
        Self {
            create_if_missing: false,
        }
    }

    /// Options that create the store on first use.
    #[must_use]
    pub fn create() -> Self {
        Self {
            create_if_missing: true,
        }
    }
}

/// Maps a store name such as `/_savedata` to a directory name.
#[must_use]
pub fn store_dir_name(store_name: &str) -> String {
    let trimmed = store_name.trim_matches('/');
    if trimmed.is_empty() {
        "_root".to_string()
    } else {
        trimmed.replace(['/', '\\'], "_")
    }
}

/// A store persisted as one JSON container file.
///
/// ```text
/// {dir}/
///   FILE_DATA.json   { "<key>": <record>, ... }
///   LOCK
/// ```
///
/// # Durability
///
/// `put` writes a temporary file, syncs it and renames it over the
/// container, so readers see either the old or the new container. Readers
/// take a shared lock on `LOCK`, writers an exclusive one.
///
/// # Example
///
/// ```no_run
/// use cloudsave_storage::{FileStore, OpenOptions, SaveRecord, StoreBackend};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("saves/_savedata"), OpenOptions::create()).unwrap();
/// store.put("timestamp", &SaveRecord::new()).unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the directory or container
    /// is missing and `options.create_if_missing` is false, or if they
    /// cannot be created.
    pub fn open(dir: &Path, options: OpenOptions) -> StorageResult<Self> {
        if !dir.exists() {
            if !options.create_if_missing {
                return Err(StorageError::unavailable(format!(
                    "store directory does not exist: {}",
                    dir.display()
                )));
            }
            fs::create_dir_all(dir).map_err(|e| {
                StorageError::unavailable(format!("cannot create {}: {e}", dir.display()))
            })?;
        }

        if !dir.is_dir() {
            return Err(StorageError::unavailable(format!(
                "store path is not a directory: {}",
                dir.display()
            )));
        }

        let store = Self {
            dir: dir.to_path_buf(),
        };

        if !store.container_path().is_file() {
            if !options.create_if_missing {
                return Err(StorageError::unavailable(format!(
                    "record container {CONTAINER_FILE} not found in {}",
                    dir.display()
                )));
            }
            let _lock = store.lock(true)?;
            store.save_container(&BTreeMap::new())?;
        }

        Ok(store)
    }

    /// Opens the store for `store_name` under a root directory.
    ///
    /// # Errors
    ///
    /// See [`FileStore::open`].
    pub fn open_named(root: &Path, store_name: &str, options: OpenOptions) -> StorageResult<Self> {
        Self::open(&root.join(store_dir_name(store_name)), options)
    }

    /// Returns the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn container_path(&self) -> PathBuf {
        self.dir.join(CONTAINER_FILE)
    }

    fn lock(&self, exclusive: bool) -> StorageResult<File> {
        let file = FsOpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))
            .map_err(|e| StorageError::unavailable(format!("cannot open lock file: {e}")))?;

        let locked = if exclusive {
            FileExt::lock_exclusive(&file)
        } else {
            FileExt::lock_shared(&file)
        };
        locked.map_err(|e| StorageError::unavailable(format!("cannot lock store: {e}")))?;

        // Released when the file is closed.
        Ok(file)
    }

    fn load_container(&self) -> StorageResult<BTreeMap<String, SaveRecord>> {
        let path = self.container_path();
        if !path.is_file() {
            return Err(StorageError::unavailable(format!(
                "record container {CONTAINER_FILE} not found in {}",
                self.dir.display()
            )));
        }
        let data = fs::read(&path)?;
        if data.is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&data)
            .map_err(|e| StorageError::Corrupted(format!("{}: {e}", path.display())))
    }

    /// Writes the container with write-temp-then-rename.
    fn save_container(&self, records: &BTreeMap<String, SaveRecord>) -> StorageResult<()> {
        let data = serde_json::to_vec(records)
            .map_err(|e| StorageError::write_failed(format!("cannot serialize records: {e}")))?;

        let temp_path = self.dir.join(CONTAINER_TEMP);
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.sync_all()?;
            drop(file);
            fs::rename(&temp_path, self.container_path())?;
            self.sync_directory()
        };

        write().map_err(|e| StorageError::write_failed(e.to_string()))
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> std::io::Result<()> {
        File::open(&self.dir)?.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> std::io::Result<()> {
        Ok(())
    }
}

impl StoreBackend for FileStore {
    fn check_available(&self) -> StorageResult<()> {
        if self.dir.is_dir() && self.container_path().is_file() {
            Ok(())
        } else {
            Err(StorageError::unavailable(format!(
                "record container {CONTAINER_FILE} not found in {}",
                self.dir.display()
            )))
        }
    }

    fn get(&self, key: &str) -> StorageResult<Option<SaveRecord>> {
        let _lock = self.lock(false)?;
        Ok(self.load_container()?.remove(key))
    }

    fn put(&self, key: &str, record: &SaveRecord) -> StorageResult<()> {
        let _lock = self.lock(true)?;
        let mut records = self.load_container().map_err(|e| match e {
            StorageError::Unavailable(msg) => StorageError::Unavailable(msg),
            other => StorageError::write_failed(other.to_string()),
        })?;
        records.insert(key.to_string(), record.clone());
        self.save_container(&records)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let _lock = self.lock(false)?;
        Ok(self.load_container()?.into_keys().collect())
    }

    fn latest(&self) -> StorageResult<Option<(String, SaveRecord)>> {
        let _lock = self.lock(false)?;
        Ok(newest(self.load_container()?))
    }
}
