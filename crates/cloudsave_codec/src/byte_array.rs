//! Signed byte arrays as JSON.
//!
//! Engines that store files as `Int8Array` serialize them either as a JSON
//! array of numbers or, after a lossy round trip through a generic object
//! serializer, as an object keyed by index (`{"0": 12, "1": -3}`).

use crate::error::{CodecError, CodecResult};
use serde_json::{Map, Value};

/// Renders bytes as a JSON array of signed bytes (-128..=127).
#[must_use]
pub fn bytes_to_signed_array(bytes: &[u8]) -> Value {
    Value::Array(
        bytes
            .iter()
            .map(|&b| Value::from(i64::from(b as i8)))
            .collect(),
    )
}

/// Reads bytes back from a JSON array or an index-keyed object.
///
/// Elements may be signed (-128..=-1) or unsigned (0..=255); both map to the
/// same byte. Object keys must cover exactly `0..len`.
///
/// # Errors
///
/// Returns an error if an element is not an integer in -128..=255 or the
/// value is neither an array nor an object.
pub fn bytes_from_json(value: &Value) -> CodecResult<Vec<u8>> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| to_byte(index, item))
            .collect(),
        Value::Object(map) => from_index_object(map),
        Value::Null => Ok(Vec::new()),
        other => Err(CodecError::UnsupportedShape(other.to_string())),
    }
}

fn from_index_object(map: &Map<String, Value>) -> CodecResult<Vec<u8>> {
    let mut bytes = vec![0u8; map.len()];
    for (key, item) in map {
        let index: usize = key
            .parse()
            .map_err(|_| CodecError::UnsupportedShape(format!("non-index key {key:?}")))?;
        let slot = bytes.get_mut(index).ok_or_else(|| {
            CodecError::UnsupportedShape(format!("index {index} out of range {}", map.len()))
        })?;
        *slot = to_byte(index, item)?;
    }
    Ok(bytes)
}

fn to_byte(index: usize, item: &Value) -> CodecResult<u8> {
    match item.as_i64() {
        Some(n @ -128..=-1) => Ok(n as i8 as u8),
        Some(n @ 0..=255) => Ok(n as u8),
        _ => Err(CodecError::InvalidByte {
            index,
            value: item.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signed_rendering() {
        assert_eq!(bytes_to_signed_array(&[0, 127, 128, 255]), json!([0, 127, -128, -1]));
    }

    #[test]
    fn reads_signed_and_unsigned_arrays() {
        assert_eq!(bytes_from_json(&json!([0, -1, 255, -128])).unwrap(), vec![0, 255, 255, 128]);
    }

    #[test]
    fn reads_index_object() {
        let value = json!({"1": -2, "0": 7, "2": 3});
        assert_eq!(bytes_from_json(&value).unwrap(), vec![7, 254, 3]);
    }

    #[test]
    fn rejects_out_of_range_elements() {
        let result = bytes_from_json(&json!([1, 256]));
        assert!(matches!(result, Err(CodecError::InvalidByte { index: 1, .. })));
    }

    #[test]
    fn rejects_sparse_index_object() {
        let result = bytes_from_json(&json!({"0": 1, "5": 2}));
        assert!(matches!(result, Err(CodecError::UnsupportedShape(_))));
    }

    #[test]
    fn rejects_strings() {
        assert!(bytes_from_json(&json!("AQID")).is_err());
    }

    #[test]
    fn full_range_roundtrip() {
        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(bytes_from_json(&bytes_to_signed_array(&all)).unwrap(), all);
    }
}
