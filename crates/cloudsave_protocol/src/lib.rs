//! # CloudSave Protocol
//!
//! Wire types of the remote Save Service.
//!
//! ```text
//! GET  /api/auth/status                              -> { authenticated }
//! GET  /api/load?gameName=<name>[&multipleFiles=true] -> { success, data }
//! POST /api/save { gameName, files } | { gameName, data } -> { success }
//! ```
//!
//! Multi-file games exchange a [`RemoteSavePayload`] (one data-URI string
//! per file). Single-file games exchange the engine's file entry as
//! [`SingleFileData`].
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod messages;
mod payload;
mod single_file;

pub use error::{ProtocolError, ProtocolResult};
pub use messages::{
    AuthStatus, LoadQuery, LoadResponse, SaveRequest, SaveResponse, AUTH_STATUS_PATH, LOAD_PATH,
    SAVE_PATH,
};
pub use payload::RemoteSavePayload;
pub use single_file::{SingleFileData, DEFAULT_FILE_MODE};
