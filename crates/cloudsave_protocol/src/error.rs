//! Error types for protocol conversions.

use cloudsave_codec::CodecError;
use thiserror::Error;

/// Result type for protocol conversions.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while turning wire payloads into records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A field could not be decoded.
    #[error("cannot decode {field}: {source}")]
    Codec {
        /// Name of the offending field.
        field: String,
        /// Underlying codec error.
        #[source]
        source: CodecError,
    },

    /// The payload does not have the expected structure.
    #[error("unexpected payload shape: {0}")]
    Shape(String),
}

impl ProtocolError {
    /// Wraps a codec error for `field`.
    pub fn codec(field: impl Into<String>, source: CodecError) -> Self {
        Self::Codec {
            field: field.into(),
            source,
        }
    }
}
