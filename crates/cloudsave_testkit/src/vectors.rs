//! Wire vectors for the data-URI codec.
//!
//! These pin the exact strings exchanged with the Save Service.

/// A byte sequence and its wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireVector {
    /// Unique identifier for this vector.
    pub id: &'static str,
    /// Decoded bytes.
    pub bytes: Vec<u8>,
    /// Encoded data URI.
    pub wire: &'static str,
}

/// Encoding vectors: every entry must encode and decode exactly.
pub fn data_uri_vectors() -> Vec<WireVector> {
    vec![
        WireVector {
            id: "empty",
            bytes: vec![],
            wire: "data:application/octet-stream;base64,",
        },
        WireVector {
            id: "one_two_three",
            bytes: vec![1, 2, 3],
            wire: "data:application/octet-stream;base64,AQID",
        },
        WireVector {
            id: "single_high_byte",
            bytes: vec![0xff],
            wire: "data:application/octet-stream;base64,/w==",
        },
        WireVector {
            id: "two_zero_bytes",
            bytes: vec![0, 0],
            wire: "data:application/octet-stream;base64,AAA=",
        },
        WireVector {
            id: "ascii_text",
            bytes: b"[General]".to_vec(),
            wire: "data:application/octet-stream;base64,W0dlbmVyYWxd",
        },
    ]
}

/// Wire strings that decode without being produced by the encoder.
pub fn lenient_decode_vectors() -> Vec<WireVector> {
    vec![
        WireVector {
            id: "other_mime_type",
            bytes: vec![1, 2, 3],
            wire: "data:text/plain;base64,AQID",
        },
        WireVector {
            id: "bare_base64_header",
            bytes: vec![0xff],
            wire: "data:;base64,/w==",
        },
    ]
}
