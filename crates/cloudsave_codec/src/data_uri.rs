//! Data-URI encoding of raw byte buffers.

use crate::contents::FileContents;
use crate::error::{CodecError, CodecResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

/// Prefix written in front of every encoded binary payload.
pub const DATA_URI_PREFIX: &str = "data:application/octet-stream;base64,";

const DATA_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// Encodes raw bytes as a base64 data URI.
///
/// Empty input yields the bare prefix, which is distinct from an absent
/// field on the wire.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(DATA_URI_PREFIX.len() + bytes.len().div_ceil(3) * 4);
    out.push_str(DATA_URI_PREFIX);
    STANDARD.encode_string(bytes, &mut out);
    out
}

/// Returns true if `s` is a `data:` URI carrying a base64 payload.
///
/// The media type is not checked; any `data:<type>;base64,` header counts.
#[must_use]
pub fn is_data_uri(s: &str) -> bool {
    base64_payload(s).is_some()
}

/// Decodes a transported string field.
///
/// - `None` or `""` decode to an empty byte buffer
/// - a base64 data URI decodes to its bytes
/// - any other string is passed through as [`FileContents::Text`]
///
/// # Errors
///
/// Returns [`CodecError::InvalidBase64`] if the payload after a base64
/// header cannot be decoded.
pub fn decode(field: Option<&str>) -> CodecResult<FileContents> {
    let Some(s) = field.filter(|s| !s.is_empty()) else {
        return Ok(FileContents::empty());
    };

    match base64_payload(s) {
        Some(payload) => STANDARD
            .decode(payload)
            .map(FileContents::Binary)
            .map_err(|e| CodecError::invalid_base64(e.to_string())),
        None => Ok(FileContents::Text(s.to_string())),
    }
}

/// Decodes a JSON field of a remote payload.
///
/// Falsy values (`null`, `false`, `0`, `""`) and absent fields become an
/// empty byte buffer. Strings go through [`decode`]. Any other value is kept
/// as its JSON text.
///
/// # Errors
///
/// Propagates [`decode`] errors for string fields.
pub fn decode_value(field: Option<&Value>) -> CodecResult<FileContents> {
    match field {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(FileContents::empty()),
        Some(Value::String(s)) => decode(Some(s)),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(FileContents::empty()),
        Some(other) => Ok(FileContents::Text(other.to_string())),
    }
}

/// Splits off the base64 payload of a data URI, if `s` is one.
fn base64_payload(s: &str) -> Option<&str> {
    let rest = s.strip_prefix(DATA_SCHEME)?;
    let (header, payload) = rest.split_once(',')?;
    header.ends_with(BASE64_MARKER).then_some(payload)
}
