//! # CloudSave Storage
//!
//! The local side of save synchronization: a structured key-value store
//! holding one [`SaveRecord`] per key, mirroring the virtual filesystem a
//! game engine persists on the device.
//!
//! ## Design Principles
//!
//! - Backends are simple record stores (get, put, list)
//! - Every access goes through a [`StoreHandle`] scoped to one sync pass
//! - Reads repair records so every expected file is always present
//! - Writes replace a record atomically
//!
//! ## Available Backends
//!
//! - [`InMemoryStore`] - For testing and ephemeral stores
//! - [`FileStore`] - A JSON record container on disk
//!
//! ## Example
//!
//! ```rust
//! use cloudsave_storage::{ExpectedFileSet, InMemoryStore, LocalStore};
//! use std::sync::Arc;
//!
//! let expected = ExpectedFileSet::new(["file0", "config.ini"]);
//! let store = LocalStore::new(Arc::new(InMemoryStore::new()), expected);
//!
//! let handle = store.open().unwrap();
//! let record = handle.read("timestamp").unwrap();
//! assert_eq!(record.len(), 2);
//! assert!(record.get("file0").unwrap().is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod handle;
mod memory;
mod record;

pub use backend::StoreBackend;
pub use error::{StorageError, StorageResult};
pub use file::{store_dir_name, FileStore, OpenOptions, CONTAINER_FILE};
pub use handle::{LocalStore, StoreHandle};
pub use memory::InMemoryStore;
pub use record::{ExpectedFileSet, SaveRecord};
