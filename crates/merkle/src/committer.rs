//! Ledger commitment
//!
//! Assembles leaves in canonical address order, builds the tree, attaches a
//! proof to every entry and content-addresses the resulting claim file.

use crate::{leaf_hash, verify_proof, MerkleError, MerkleTree};
use merit_types::{Amount, BlockNumber, ClaimEntry, ClaimFile, Hash32, TokenId};
use merit_ledger::RewardLedger;
use std::collections::BTreeMap;
use tracing::info;

/// A committed cumulative ledger: the root the registry sees, the content
/// hash the file is stored under, and the claim file itself.
#[derive(Clone, Debug)]
pub struct Commitment {
    pub merkle_root: Hash32,
    pub content_hash: Hash32,
    pub leaf_count: usize,
    pub claim_file: ClaimFile,
}

/// Commit a cumulative ledger for publication.
///
/// Leaves are assembled from the ledger's `BTreeMap` iteration, so the tree
/// is a pure function of the ledger contents: identical ledgers commit to
/// identical roots and content hashes regardless of how they were built.
pub fn commit(
    ledger: &RewardLedger,
    network_id: &str,
    start_block: BlockNumber,
    end_block: BlockNumber,
) -> Result<Commitment, MerkleError> {
    if ledger.is_empty() {
        return Err(MerkleError::EmptyTree);
    }

    let mut leaves = Vec::with_capacity(ledger.address_count());
    for (address, tokens) in &ledger.entries {
        let pairs: Vec<(&TokenId, Amount)> = tokens.iter().map(|(t, a)| (t, *a)).collect();
        leaves.push(leaf_hash(address, &pairs));
    }

    let tree = MerkleTree::build(leaves)?;
    let merkle_root = tree.root();

    let mut entries = BTreeMap::new();
    for (index, (address, tokens)) in ledger.entries.iter().enumerate() {
        let proof = tree.proof_for(index)?;
        entries.insert(
            address.clone(),
            ClaimEntry {
                tokens: tokens.keys().cloned().collect(),
                cumulative_amounts: tokens.values().copied().collect(),
                proof: proof.path,
            },
        );
    }

    let claim_file = ClaimFile {
        network_id: network_id.to_string(),
        cycle: ledger.cycle,
        start_block,
        end_block,
        merkle_root,
        entries,
    };
    let content_hash: Hash32 = blake3::hash(&claim_file.canonical_bytes()?).into();

    info!(
        target: "merkle",
        "cycle {}: committed {} leaves, root 0x{}",
        ledger.cycle,
        tree.leaf_count(),
        hex::encode(merkle_root)
    );

    Ok(Commitment {
        merkle_root,
        content_hash,
        leaf_count: tree.leaf_count(),
        claim_file,
    })
}

/// Recompute every leaf in a claim file and check its proof against the
/// file's root. Entry order in the file is the leaf order.
pub fn claims_are_valid(file: &ClaimFile) -> bool {
    let leaf_count = file.entries.len();
    file.entries.iter().enumerate().all(|(index, (address, entry))| {
        let pairs: Vec<(&TokenId, Amount)> = entry
            .tokens
            .iter()
            .zip(entry.cumulative_amounts.iter().copied())
            .collect();
        let leaf = leaf_hash(address, &pairs);
        verify_proof(leaf, index, &entry.proof, leaf_count, file.merkle_root)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use merit_types::Address;
    use proptest::prelude::*;

    fn ledger_from(grants: &[(&str, &str, Amount)]) -> RewardLedger {
        let mut ledger = RewardLedger::new(1);
        for (addr, token, amount) in grants {
            ledger
                .credit(Address::new(*addr), TokenId::new(*token), *amount)
                .unwrap();
        }
        ledger
    }

    #[test]
    fn empty_ledger_cannot_commit() {
        let ledger = RewardLedger::new(1);
        assert!(matches!(
            commit(&ledger, "testnet", 0, 100),
            Err(MerkleError::EmptyTree)
        ));
    }

    #[test]
    fn commit_is_deterministic_under_insertion_shuffle() {
        let forward = ledger_from(&[
            ("0xaa", "0xt1", 100),
            ("0xbb", "0xt1", 200),
            ("0xcc", "0xt2", 300),
        ]);
        let reversed = ledger_from(&[
            ("0xcc", "0xt2", 300),
            ("0xbb", "0xt1", 200),
            ("0xaa", "0xt1", 100),
        ]);

        let a = commit(&forward, "testnet", 0, 100).unwrap();
        let b = commit(&reversed, "testnet", 0, 100).unwrap();
        assert_eq!(a.merkle_root, b.merkle_root);
        assert_eq!(a.content_hash, b.content_hash);
        assert_eq!(
            a.claim_file.canonical_bytes().unwrap(),
            b.claim_file.canonical_bytes().unwrap()
        );
    }

    #[test]
    fn every_claim_proof_verifies() {
        let ledger = ledger_from(&[
            ("0xaa", "0xt1", 100),
            ("0xbb", "0xt1", 200),
            ("0xcc", "0xt1", 300),
            ("0xdd", "0xt2", 400),
            ("0xee", "0xt2", 500),
        ]);
        let commitment = commit(&ledger, "testnet", 0, 100).unwrap();
        assert!(claims_are_valid(&commitment.claim_file));
    }

    #[test]
    fn mutating_one_entry_invalidates_only_its_proof() {
        let ledger = ledger_from(&[
            ("0xaa", "0xt1", 100),
            ("0xbb", "0xt1", 200),
            ("0xcc", "0xt1", 300),
            ("0xdd", "0xt1", 400),
        ]);
        let commitment = commit(&ledger, "testnet", 0, 100).unwrap();
        let mut file = commitment.claim_file.clone();

        // perturb one amount without recommitting
        let target = Address::new("0xbb");
        file.entries.get_mut(&target).unwrap().cumulative_amounts[0] += 1;

        let leaf_count = file.entries.len();
        for (index, (address, entry)) in file.entries.iter().enumerate() {
            let pairs: Vec<(&TokenId, Amount)> = entry
                .tokens
                .iter()
                .zip(entry.cumulative_amounts.iter().copied())
                .collect();
            let leaf = leaf_hash(address, &pairs);
            let ok = verify_proof(leaf, index, &entry.proof, leaf_count, file.merkle_root);
            if *address == target {
                assert!(!ok, "mutated entry must fail");
            } else {
                assert!(ok, "unrelated entry {address} must still verify");
            }
        }
    }

    #[test]
    fn content_hash_tracks_content() {
        let ledger = ledger_from(&[("0xaa", "0xt1", 100)]);
        let a = commit(&ledger, "testnet", 0, 100).unwrap();
        let b = commit(&ledger, "testnet", 0, 101).unwrap();
        // same root (same ledger) but different file content
        assert_eq!(a.merkle_root, b.merkle_root);
        assert_ne!(a.content_hash, b.content_hash);
    }

    proptest! {
        #[test]
        fn root_is_pure_function_of_contents(grants in prop::collection::vec(
            (0u8..16, 0u8..3, 1u128..1_000_000), 1..24)) {
            let entries: Vec<(String, String, Amount)> = grants
                .iter()
                .map(|(a, t, amount)| (format!("0x{a:02x}"), format!("0xt{t}"), *amount))
                .collect();
            let forward: Vec<(&str, &str, Amount)> = entries
                .iter()
                .map(|(a, t, amount)| (a.as_str(), t.as_str(), *amount))
                .collect();
            let mut backward = forward.clone();
            backward.reverse();

            let a = commit(&ledger_from(&forward), "testnet", 0, 10).unwrap();
            let b = commit(&ledger_from(&backward), "testnet", 0, 10).unwrap();
            prop_assert_eq!(a.merkle_root, b.merkle_root);
            prop_assert!(claims_are_valid(&a.claim_file));
        }
    }
}
