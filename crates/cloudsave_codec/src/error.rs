//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding transported save data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The payload after a base64 data-URI header is not valid base64.
    #[error("invalid base64 payload: {message}")]
    InvalidBase64 {
        /// Decoder message.
        message: String,
    },

    /// A JSON byte array contained something other than a byte.
    #[error("invalid byte at index {index}: {value}")]
    InvalidByte {
        /// Position of the offending element.
        index: usize,
        /// The offending JSON value, rendered as text.
        value: String,
    },

    /// The JSON value does not have a shape that can carry bytes.
    #[error("unsupported shape for byte contents: {0}")]
    UnsupportedShape(String),
}

impl CodecError {
    /// Create an invalid base64 error.
    pub fn invalid_base64(message: impl Into<String>) -> Self {
        Self::InvalidBase64 {
            message: message.into(),
        }
    }
}
