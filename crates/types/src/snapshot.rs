//! Balance snapshots
//!
//! A snapshot maps addresses to stake weights for one source at one block,
//! produced externally and consumed read-only by the distribution engine.
//! The transformation methods return new snapshots; the pipeline applies
//! them in a fixed order (blacklist, uniform weight ratio, boosts) before
//! any token math runs.

use crate::{Address, Amount, Ratio, RatioError, SourceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a source belongs to the native or non-native distribution pool.
/// Selects which side of the configured allocation split it receives; boosts
/// apply to non-native sources only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Native,
    NonNative,
}

/// Per-address stake weights for one source at one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub source: SourceId,
    pub kind: SourceKind,
    /// Uniform scalar applied to every weight (e.g. a price or peg ratio)
    pub weight_ratio: Ratio,
    pub balances: BTreeMap<Address, Amount>,
}

impl BalanceSnapshot {
    pub fn new(source: SourceId, kind: SourceKind, weight_ratio: Ratio) -> Self {
        Self {
            source,
            kind,
            weight_ratio,
            balances: BTreeMap::new(),
        }
    }

    /// Drop excluded addresses (blacklist filtering).
    pub fn without(mut self, excluded: &[Address]) -> Self {
        for addr in excluded {
            self.balances.remove(addr);
        }
        self
    }

    /// Apply the uniform weight ratio to every balance.
    pub fn scaled(mut self) -> Result<Self, RatioError> {
        if self.weight_ratio.is_one() {
            return Ok(self);
        }
        for weight in self.balances.values_mut() {
            *weight = self.weight_ratio.apply(*weight)?;
        }
        Ok(self)
    }

    /// Apply per-address boost multipliers.
    pub fn boosted(mut self, boosts: &BoostTable) -> Result<Self, RatioError> {
        for (addr, weight) in self.balances.iter_mut() {
            let multiplier = boosts.multiplier_for(addr);
            if !multiplier.is_one() {
                *weight = multiplier.apply(*weight)?;
            }
        }
        Ok(self)
    }

    /// Sum of all weights; `None` on overflow.
    pub fn total_weight(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(0u128, |acc, w| acc.checked_add(*w))
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }
}

/// Per-address boost multipliers; an absent address means no boost.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostTable(pub BTreeMap<Address, Ratio>);

impl BoostTable {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn multiplier_for(&self, addr: &Address) -> Ratio {
        self.0.get(addr).copied().unwrap_or_else(Ratio::one)
    }
}
