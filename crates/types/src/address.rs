//! Account, token and source identifiers
//!
//! All identifiers normalize to lowercase on construction so that ordering,
//! equality and the Merkle leaf order are a pure function of content rather
//! than of the casing a provider happened to return.

use serde::{Deserialize, Serialize};

/// Account identifier (lowercased hex account string).
///
/// `Ord` on the lowercase form is the canonical leaf ordering used by the
/// commitment layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create a new address, normalizing to lowercase
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into().to_lowercase())
    }

    /// Get the address as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes of the normalized form (used by leaf encoding)
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token contract identifier, normalized like [`Address`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(String);

impl TokenId {
    /// Create a new token id, normalizing to lowercase
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().to_lowercase())
    }

    /// Get the token id as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes of the normalized form
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for one yield pool contributing balances and schedules.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
