//! 32-byte hash values and their hex serde representation

use serde::{Deserialize, Deserializer, Serializer};
use thiserror::Error;

/// 32-byte hash (Merkle roots, content hashes, proof nodes).
pub type Hash32 = [u8; 32];

#[derive(Debug, Error)]
pub enum HashParseError {
    #[error("invalid hex hash: {0}")]
    InvalidHex(String),
    #[error("invalid hash length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Render a hash as `0x`-prefixed lowercase hex.
pub fn hash_to_hex(hash: &Hash32) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a hash from hex, with or without a `0x` prefix.
pub fn hash_from_hex(s: &str) -> Result<Hash32, HashParseError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes =
        hex::decode(stripped).map_err(|_| HashParseError::InvalidHex(s.to_string()))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| HashParseError::InvalidLength(len))
}

/// Serde adapter serializing a [`Hash32`] as a hex string.
///
/// Usage: `#[serde(with = "merit_types::serde_hex32")]`
pub mod serde_hex32 {
    use super::*;

    pub fn serialize<S: Serializer>(hash: &Hash32, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&hash_to_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Hash32, D::Error> {
        let s = String::deserialize(de)?;
        hash_from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Vec<Hash32>` (proof paths).
pub mod serde_hex32_vec {
    use super::*;

    pub fn serialize<S: Serializer>(hashes: &[Hash32], ser: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = ser.serialize_seq(Some(hashes.len()))?;
        for h in hashes {
            seq.serialize_element(&hash_to_hex(h))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Hash32>, D::Error> {
        let strings = Vec::<String>::deserialize(de)?;
        strings
            .iter()
            .map(|s| hash_from_hex(s).map_err(serde::de::Error::custom))
            .collect()
    }
}
