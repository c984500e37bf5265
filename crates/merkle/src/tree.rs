//! Binary Merkle tree with odd-node carry
//!
//! Odd-node policy: an odd trailing node is promoted to the next level
//! unchanged (never duplicated), and contributes no sibling element to
//! proofs at that level. Proposer and guardian share this one
//! implementation; verification walks the same level sizes, so both sides
//! agree on when a level carries.

use crate::MerkleError;
use merit_types::Hash32;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Sibling path from a leaf to the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf_index: usize,
    #[serde(with = "merit_types::serde_hex32")]
    pub leaf_hash: Hash32,
    #[serde(with = "merit_types::serde_hex32_vec")]
    pub path: Vec<Hash32>,
}

/// Fixed-shape Merkle tree over a canonical leaf sequence.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Build a tree; at least one leaf is required.
    pub fn build(leaves: Vec<Hash32>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        let mut levels = vec![leaves];
        while levels[levels.len() - 1].len() > 1 {
            let current = &levels[levels.len() - 1];
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                match pair {
                    [left, right] => next.push(hash_pair(left, right)),
                    // odd trailing node carries up unchanged
                    [single] => next.push(*single),
                    _ => unreachable!(),
                }
            }
            levels.push(next);
        }
        Ok(Self { levels })
    }

    pub fn root(&self) -> Hash32 {
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Sibling path for the leaf at `index`.
    pub fn proof_for(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        let leaves = self.leaf_count();
        if index >= leaves {
            return Err(MerkleError::InvalidIndex { index, leaves });
        }

        let mut path = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = idx ^ 1;
            if sibling < level.len() {
                path.push(level[sibling]);
            }
            idx /= 2;
        }

        Ok(MerkleProof {
            leaf_index: index,
            leaf_hash: self.levels[0][index],
            path,
        })
    }
}

/// Verify a sibling path against a root.
///
/// `leaf_count` fixes the tree shape, which tells the verifier at which
/// levels the node was carried without a sibling.
pub fn verify_proof(
    leaf_hash: Hash32,
    leaf_index: usize,
    path: &[Hash32],
    leaf_count: usize,
    root: Hash32,
) -> bool {
    if leaf_index >= leaf_count || leaf_count == 0 {
        return false;
    }

    let mut current = leaf_hash;
    let mut idx = leaf_index;
    let mut size = leaf_count;
    let mut elements = path.iter();

    while size > 1 {
        let is_carried = idx == size - 1 && size % 2 == 1;
        if !is_carried {
            let Some(sibling) = elements.next() else {
                return false;
            };
            current = if idx % 2 == 0 {
                hash_pair(&current, sibling)
            } else {
                hash_pair(sibling, &current)
            };
        }
        idx /= 2;
        size = size.div_ceil(2);
    }

    elements.next().is_none() && current == root
}

fn hash_pair(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}
