//! Error types for the Save Service.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the Save Service.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The session is not signed in.
    #[error("not authenticated")]
    NotAuthenticated,

    /// No save stored for the game.
    #[error("no save found for {0}")]
    NotFound(String),

    /// The request exceeds the configured size limit.
    #[error("payload too large: {size} bytes, limit {limit}")]
    PayloadTooLarge {
        /// Request size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::InvalidRequest(_) => 400,
            ServerError::NotAuthenticated => 401,
            ServerError::NotFound(_) => 404,
            ServerError::PayloadTooLarge { .. } => 413,
            ServerError::Internal(_) => 500,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
