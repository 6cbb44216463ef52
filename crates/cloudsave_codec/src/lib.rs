//! # CloudSave Codec
//!
//! Moves raw save-file bytes losslessly through JSON-only transports.
//!
//! Binary contents travel as self-describing data URIs:
//!
//! ```text
//! data:application/octet-stream;base64,<standard base64 payload>
//! ```
//!
//! ## Rules
//!
//! - Empty input encodes to the prefix with an empty payload
//! - A string that is not a base64 data URI is passed through as text
//! - An absent or falsy field decodes to an empty byte buffer
//! - Every byte value 0–255 survives a round trip; the payload is never
//!   assumed to be valid UTF-8
//!
//! ## Usage
//!
//! ```
//! use cloudsave_codec::{decode, encode, FileContents};
//!
//! let uri = encode(&[1, 2, 3]);
//! assert_eq!(uri, "data:application/octet-stream;base64,AQID");
//!
//! let decoded = decode(Some(&uri)).unwrap();
//! assert_eq!(decoded, FileContents::Binary(vec![1, 2, 3]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod byte_array;
mod contents;
mod data_uri;
mod error;

pub use byte_array::{bytes_from_json, bytes_to_signed_array};
pub use contents::FileContents;
pub use data_uri::{decode, decode_value, encode, is_data_uri, DATA_URI_PREFIX};
pub use error::{CodecError, CodecResult};
