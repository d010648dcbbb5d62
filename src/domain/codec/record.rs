//! Record and string-list codec (JSON)

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::domain::DomainError;

/// A structured record: a string-keyed map of scalars, lists and nested maps
///
/// Strings, integers, floats, booleans, null, nested maps and lists all
/// round-trip exactly. Non-finite floats and non-text keys are not
/// representable in the wire format.
pub type Record = Map<String, Value>;

/// Serializes a record to its UTF-8 JSON wire form
pub fn encode_record(record: &Record) -> Result<Bytes, DomainError> {
    let data = serde_json::to_vec(record)
        .map_err(|e| DomainError::codec(format!("Failed to encode record: {}", e)))?;

    Ok(Bytes::from(data))
}

/// Deserializes a record from its wire form
///
/// Malformed bytes surface as a codec error; there is no recovery path.
pub fn decode_record(bytes: &[u8]) -> Result<Record, DomainError> {
    serde_json::from_slice(bytes)
        .map_err(|e| DomainError::codec(format!("Failed to decode record: {}", e)))
}

/// Serializes an ordered list of strings
pub fn encode_string_list(list: &[String]) -> Result<Bytes, DomainError> {
    let data = serde_json::to_vec(list)
        .map_err(|e| DomainError::codec(format!("Failed to encode string list: {}", e)))?;

    Ok(Bytes::from(data))
}

/// Deserializes an ordered list of strings
pub fn decode_string_list(bytes: &[u8]) -> Result<Vec<String>, DomainError> {
    serde_json::from_slice(bytes)
        .map_err(|e| DomainError::codec(format!("Failed to decode string list: {}", e)))
}
