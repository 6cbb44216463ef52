//! Single-file wire payload.

use crate::error::{ProtocolError, ProtocolResult};
use chrono::{DateTime, Utc};
use cloudsave_codec::{bytes_from_json, bytes_to_signed_array, FileContents};
use cloudsave_storage::SaveRecord;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Mode bits of a regular engine file (`0o100666`).
pub const DEFAULT_FILE_MODE: u32 = 0o100_666;

/// One engine file entry as exchanged by single-file games.
///
/// ```json
/// { "timestamp": "2025-01-01T00:00:00.000Z", "mode": 33206, "contents": [12, -3, 0] }
/// ```
///
/// `contents` is a signed byte array. It is accepted either as a JSON array
/// or as an index-keyed object, since both forms reach the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleFileData {
    /// Last-modified time.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    /// POSIX mode bits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    /// File bytes.
    #[serde(
        default,
        serialize_with = "signed_bytes",
        deserialize_with = "any_bytes"
    )]
    pub contents: Vec<u8>,
}

impl SingleFileData {
    /// Takes `file_name` out of a record.
    ///
    /// Text contents are sent as their UTF-8 bytes. A record without the
    /// file yields empty contents.
    pub fn from_record(record: &SaveRecord, file_name: &str) -> Self {
        let contents = match record.get(file_name) {
            Some(FileContents::Binary(bytes)) => bytes.clone(),
            Some(FileContents::Text(text)) => text.clone().into_bytes(),
            None => Vec::new(),
        };
        Self {
            timestamp: record.modified,
            mode: Some(record.mode.unwrap_or(DEFAULT_FILE_MODE)),
            contents,
        }
    }

    /// Parses the `data` field of a single-file load response.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Shape`] if `data` is not a file entry.
    pub fn from_value(data: Value) -> ProtocolResult<Self> {
        serde_json::from_value(data).map_err(|e| ProtocolError::Shape(e.to_string()))
    }

    /// Builds a record holding this entry under `file_name`.
    pub fn into_record(self, file_name: &str) -> SaveRecord {
        SaveRecord {
            modified: self.timestamp,
            mode: self.mode,
            ..SaveRecord::new()
        }
        .with_file(file_name, self.contents)
    }
}

#[allow(clippy::ptr_arg)]
fn signed_bytes<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    bytes_to_signed_array(bytes).serialize(serializer)
}

fn any_bytes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    bytes_from_json(&value).map_err(D::Error::custom)
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc)))
}
