//! Property-based test generators using proptest.
//!
//! Provides strategies for generating save files and records.

use cloudsave_codec::FileContents;
use cloudsave_storage::{ExpectedFileSet, SaveRecord};
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Strategy for generating file bytes.
pub fn file_bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

/// Strategy for generating logical file names.
pub fn file_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}(\\.ini)?").expect("Invalid regex")
}

/// Strategy for generating text fields.
///
/// Never produces a `data:` URI.
pub fn text_field_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 =\\[\\]]{1,32}").expect("Invalid regex")
}

/// Strategy for generating file contents, mostly binary.
pub fn file_contents_strategy() -> impl Strategy<Value = FileContents> {
    prop_oneof![
        4 => file_bytes_strategy().prop_map(FileContents::Binary),
        1 => text_field_strategy().prop_map(FileContents::Text),
    ]
}

/// Strategy for generating a record holding any subset of `expected`.
pub fn partial_record_strategy(expected: ExpectedFileSet) -> impl Strategy<Value = SaveRecord> {
    let names: Vec<String> = expected.iter().map(str::to_string).collect();
    let len = names.len();
    prop::collection::vec(prop::option::of(file_bytes_strategy()), len).prop_map(move |files| {
        let mut record = SaveRecord::new();
        for (name, bytes) in names.iter().zip(files) {
            if let Some(bytes) = bytes {
                record.insert(name.as_str(), bytes);
            }
        }
        record
    })
}

/// Strategy for generating bytes with their index-keyed JSON object.
///
/// The object holds the signed value of each byte, as a JavaScript typed
/// array serializes.
pub fn index_object_strategy() -> impl Strategy<Value = (Vec<u8>, Value)> {
    file_bytes_strategy().prop_map(|bytes| {
        let object: Map<String, Value> = bytes
            .iter()
            .enumerate()
            .map(|(i, b)| (i.to_string(), Value::from(*b as i8)))
            .collect();
        (bytes, Value::Object(object))
    })
}
