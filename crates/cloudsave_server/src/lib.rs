//! # CloudSave Server
//!
//! Reference, in-process implementation of the Save Service.
//!
//! This crate provides:
//! - The three endpoints (`/api/auth/status`, `/api/load`, `/api/save`)
//!   as plain handler methods
//! - Per-game save storage, keyed by `gameName`
//! - A session flag standing in for cookie authentication
//!
//! No listener is bound; hosts expose the handlers through their own HTTP
//! layer, and tests call them directly.
//!
//! ```
//! use cloudsave_protocol::{LoadQuery, RemoteSavePayload, SaveRequest};
//! use cloudsave_server::{SaveServer, ServerConfig};
//!
//! let server = SaveServer::new(ServerConfig::default());
//! server
//!     .handle_save(SaveRequest::multi_file("Undertale", RemoteSavePayload::new()))
//!     .unwrap();
//! let response = server.handle_load(&LoadQuery::new("Undertale", true)).unwrap();
//! assert!(response.success);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod saves;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use saves::{SaveTable, StoredSave};
pub use server::SaveServer;
