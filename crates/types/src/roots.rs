//! Published root records and the external registry view

use crate::{BlockNumber, Cycle, Hash32, Timestamp};
use serde::{Deserialize, Serialize};

/// One proposed or approved root for a cycle.
///
/// The registry holds at most one pending and one current record; a new
/// proposal cannot exist while one is pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootRecord {
    #[serde(with = "crate::serde_hex32")]
    pub merkle_root: Hash32,
    #[serde(with = "crate::serde_hex32")]
    pub content_hash: Hash32,
    pub cycle: Cycle,
    pub start_block: BlockNumber,
    pub end_block: BlockNumber,
    /// Registry-side publication time (propose time for pending records)
    pub published_at: Timestamp,
    /// Chain height at which the registry recorded this root
    pub published_block: BlockNumber,
}

/// Read snapshot of the external on-chain root registry.
///
/// The coordinator only reads this state and emits propose/approve
/// instructions; it never writes the registry itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryView {
    pub pending: Option<RootRecord>,
    pub current: Option<RootRecord>,
    pub current_cycle: Cycle,
}

impl RegistryView {
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cycle index the next proposal must carry.
    pub fn next_cycle(&self) -> Cycle {
        self.current_cycle + 1
    }
}
