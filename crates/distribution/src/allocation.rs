//! Allocation split between native and non-native sources
//!
//! The split is an injected policy value rather than a branch on a string
//! tag, so the engine stays pure and unit-testable without configuration.

use merit_types::{Ratio, RatioError, SourceKind};
use serde::{Deserialize, Serialize};

/// Fraction of each token distribution granted to native sources; non-native
/// sources receive the complement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPolicy {
    native: Ratio,
    non_native: Ratio,
}

impl AllocationPolicy {
    /// Build a policy from the native-side fraction (must be at most one).
    pub fn from_native_share(native: Ratio) -> Result<Self, RatioError> {
        Ok(Self {
            native,
            non_native: native.complement()?,
        })
    }

    /// A pass-through policy granting every source its full distribution.
    pub fn even() -> Self {
        Self {
            native: Ratio::one(),
            non_native: Ratio::one(),
        }
    }

    pub fn ratio_for(&self, kind: SourceKind) -> Ratio {
        match kind {
            SourceKind::Native => self.native,
            SourceKind::NonNative => self.non_native,
        }
    }
}
