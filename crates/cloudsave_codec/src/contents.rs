//! Contents of one logical save file.

use crate::data_uri::{decode_value, encode};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The contents of a single logical save file.
///
/// Save files are normally raw bytes. A field the server hands back as a
/// plain string is kept as text so that it can be sent back unchanged.
///
/// Serializes to the same string form used on the wire: binary contents as
/// a base64 data URI, text as itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContents {
    /// Raw bytes (possibly empty).
    Binary(Vec<u8>),
    /// A non-binary field passed through unchanged.
    Text(String),
}

impl FileContents {
    /// An empty binary buffer, the placeholder for a file that does not
    /// exist yet.
    #[must_use]
    pub fn empty() -> Self {
        FileContents::Binary(Vec::new())
    }

    /// Returns true if there is no content at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            FileContents::Binary(bytes) => bytes.is_empty(),
            FileContents::Text(text) => text.is_empty(),
        }
    }

    /// Length of the contents in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            FileContents::Binary(bytes) => bytes.len(),
            FileContents::Text(text) => text.len(),
        }
    }

    /// Returns the raw bytes for binary contents.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FileContents::Binary(bytes) => Some(bytes),
            FileContents::Text(_) => None,
        }
    }

    /// Renders the contents as a transport string.
    #[must_use]
    pub fn to_wire_string(&self) -> String {
        match self {
            FileContents::Binary(bytes) => encode(bytes),
            FileContents::Text(text) => text.clone(),
        }
    }
}

impl Default for FileContents {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<u8>> for FileContents {
    fn from(bytes: Vec<u8>) -> Self {
        FileContents::Binary(bytes)
    }
}

impl From<&[u8]> for FileContents {
    fn from(bytes: &[u8]) -> Self {
        FileContents::Binary(bytes.to_vec())
    }
}

impl Serialize for FileContents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire_string())
    }
}

impl<'de> Deserialize<'de> for FileContents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_value(Some(&value)).map_err(D::Error::custom)
    }
}
