//! Shared value codec for internal records
//!
//! Every value eventide stores besides raw log payloads (item envelopes,
//! alias lists, view checkpoints, schema records) goes through these two
//! functions, so the on-disk value format is decided in one place.

use crate::error::{EventideError, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Encode a record with bincode
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| EventideError::Serialization(e.to_string()))
}

/// Decode a record previously written with [`encode`]
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| EventideError::Serialization(e.to_string()))
}

/// Encode a big-endian u64 counter value
pub fn encode_u64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decode a big-endian u64 counter value
pub fn decode_u64(bytes: &[u8]) -> Result<u64> {
    let arr: [u8; 8] = bytes.try_into().map_err(|_| {
        EventideError::Serialization(format!("expected 8-byte counter, got {} bytes", bytes.len()))
    })?;
    Ok(u64::from_be_bytes(arr))
}
