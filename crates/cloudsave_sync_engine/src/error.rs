//! Error types for the sync engine.

use cloudsave_protocol::ProtocolError;
use cloudsave_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can end a sync pass.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The local store could not be opened or read.
    #[error("local store unavailable: {0}")]
    StoreUnavailable(#[source] StorageError),

    /// A record could not be written. Local state is presumed unchanged.
    #[error("local store write failed: {0}")]
    StoreWrite(#[source] StorageError),

    /// The session is not authenticated. Remote calls are skipped.
    #[error("authentication required")]
    AuthRequired,

    /// Network failure, non-success status or explicit failure flag.
    #[error("save service unavailable: {0}")]
    RemoteUnavailable(String),

    /// The service answered with something that cannot be decoded.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A remote call did not complete in time.
    #[error("remote call timed out")]
    Timeout,

    /// The engine or transport was configured with invalid values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    /// Returns true for failures on the remote side of the pass.
    ///
    /// Malformed payloads and timeouts count as the service being
    /// unavailable.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            SyncError::RemoteUnavailable(_) | SyncError::MalformedPayload(_) | SyncError::Timeout
        )
    }

    /// Returns true for failures of the local store.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, SyncError::StoreUnavailable(_) | SyncError::StoreWrite(_))
    }
}

impl From<StorageError> for SyncError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::WriteFailed(_) => SyncError::StoreWrite(err),
            other => SyncError::StoreUnavailable(other),
        }
    }
}

impl From<ProtocolError> for SyncError {
    fn from(err: ProtocolError) -> Self {
        SyncError::MalformedPayload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures() {
        assert!(SyncError::RemoteUnavailable("HTTP 500".into()).is_remote_failure());
        assert!(SyncError::MalformedPayload("not json".into()).is_remote_failure());
        assert!(SyncError::Timeout.is_remote_failure());
        assert!(!SyncError::AuthRequired.is_remote_failure());
    }

    #[test]
    fn storage_errors_map_by_kind() {
        let err = SyncError::from(StorageError::write_failed("disk full"));
        assert!(matches!(err, SyncError::StoreWrite(_)));
        assert!(err.is_store_failure());

        let err = SyncError::from(StorageError::unavailable("no container"));
        assert!(matches!(err, SyncError::StoreUnavailable(_)));

        let err = SyncError::from(StorageError::Closed);
        assert!(matches!(err, SyncError::StoreUnavailable(_)));
    }

    #[test]
    fn error_display() {
        assert_eq!(SyncError::Timeout.to_string(), "remote call timed out");
        assert_eq!(
            SyncError::RemoteUnavailable("HTTP 404".into()).to_string(),
            "save service unavailable: HTTP 404"
        );
    }
}
