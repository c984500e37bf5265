//! Content-addressed claim files
//!
//! The published artifact for one cycle: the full cumulative ledger with
//! per-address Merkle proofs. Files are keyed by `(network_id, content
//! hash)` so any tampering changes the address they are found under. Entry
//! maps are `BTreeMap`s, which makes `canonical_bytes` independent of
//! construction order.

use crate::{Address, Amount, BlockNumber, Cycle, Hash32, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One address's cumulative entitlement plus its proof path.
///
/// `tokens` and `cumulative_amounts` are parallel vectors in canonical
/// `TokenId` order — the same ordering the leaf encoding hashes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    pub tokens: Vec<TokenId>,
    pub cumulative_amounts: Vec<Amount>,
    #[serde(with = "crate::serde_hex32_vec")]
    pub proof: Vec<Hash32>,
}

/// The full published ledger for one cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimFile {
    pub network_id: String,
    pub cycle: Cycle,
    pub start_block: BlockNumber,
    pub end_block: BlockNumber,
    #[serde(with = "crate::serde_hex32")]
    pub merkle_root: Hash32,
    pub entries: BTreeMap<Address, ClaimEntry>,
}

impl ClaimFile {
    /// Canonical serialization the content hash is computed over.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Iterate `(address, token, cumulative amount)` triples.
    pub fn amounts(&self) -> impl Iterator<Item = (&Address, &TokenId, Amount)> {
        self.entries.iter().flat_map(|(addr, entry)| {
            entry
                .tokens
                .iter()
                .zip(entry.cumulative_amounts.iter())
                .map(move |(token, amount)| (addr, token, *amount))
        })
    }

    /// Sum of all committed amounts; `None` on overflow.
    pub fn total_value(&self) -> Option<Amount> {
        self.amounts()
            .try_fold(0u128, |acc, (_, _, amount)| acc.checked_add(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClaimFile {
        let mut entries = BTreeMap::new();
        entries.insert(
            Address::new("0xaa"),
            ClaimEntry {
                tokens: vec![TokenId::new("0xt1"), TokenId::new("0xt2")],
                cumulative_amounts: vec![100, 200],
                proof: vec![[0x33; 32]],
            },
        );
        ClaimFile {
            network_id: "testnet".into(),
            cycle: 1,
            start_block: 0,
            end_block: 100,
            merkle_root: [0x44; 32],
            entries,
        }
    }

    #[test]
    fn canonical_bytes_round_trip() {
        let file = sample();
        let bytes = file.canonical_bytes().unwrap();
        let back: ClaimFile = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, file);
        // identical contents serialize identically
        assert_eq!(bytes, back.canonical_bytes().unwrap());
    }

    #[test]
    fn amounts_iterates_pairs() {
        let file = sample();
        let amounts: Vec<Amount> = file.amounts().map(|(_, _, a)| a).collect();
        assert_eq!(amounts, vec![100, 200]);
        assert_eq!(file.total_value(), Some(300));
    }
}
