//! # CloudSave Sync Engine
//!
//! Keeps a game's local save store and the remote Save Service in step.
//!
//! This crate provides:
//! - Per-game profiles (store name, record key, expected files)
//! - The sync state machine (idle → read local → push or pull → idle)
//! - A periodic, event-triggerable sync loop
//! - The best-effort emergency push on shutdown
//! - A reqwest HTTP transport and a mock transport for tests
//!
//! ## Sync Pass
//!
//! 1. Read the local record (repairing missing files)
//! 2. Skip silently unless the session is authenticated
//! 3. If any expected file has content, push every expected file
//! 4. Otherwise pull the remote save and replace the local record
//!
//! ## Key Invariants
//!
//! - A failed pass never mutates the local record
//! - A pull replaces the record entirely (no field merge)
//! - Passes never overlap
//! - Errors end the pass and are logged; the next tick starts from scratch

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod state;
mod transport;

pub use config::{GameProfile, PayloadShape, SyncConfig, MIN_SYNC_INTERVAL, UNDERTALE_FILES};
pub use error::{SyncError, SyncResult};
pub use http::HttpSaveService;
pub use state::{PassOutcome, SessionCapability, SyncEngine, SyncState, SyncStats};
pub use transport::{MockCall, MockSaveService, SaveService};
