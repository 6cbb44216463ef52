//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store cannot be opened or its record container is missing.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A record could not be persisted. Local state is presumed unchanged.
    #[error("store write failed: {0}")]
    WriteFailed(String),

    /// The stored data could not be parsed.
    #[error("store corrupted: {0}")]
    Corrupted(String),

    /// The handle has been closed.
    #[error("store handle is closed")]
    Closed,

    /// An I/O error occurred while reading.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a write error.
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::WriteFailed(message.into())
    }
}
