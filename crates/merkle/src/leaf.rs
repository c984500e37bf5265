//! Canonical leaf encoding
//!
//! One leaf commits one address's full cumulative entry. The byte layout is
//! length-prefixed so distinct entries can never encode to the same buffer:
//!
//! ```text
//! u32be(len(address)) || address
//! u32be(token count)
//! per token, in TokenId order:
//!   u32be(len(token)) || token || u128be(amount)
//! ```
//!
//! The leaf hash is Sha256 over that buffer.

use merit_types::{Address, Amount, Hash32, TokenId};
use sha2::{Digest, Sha256};

/// Hash one address's ordered `(token, amount)` pairs into a leaf.
///
/// Callers must pass the pairs in canonical `TokenId` order; the ledger's
/// `BTreeMap` iteration already guarantees this.
pub fn leaf_hash(address: &Address, amounts: &[(&TokenId, Amount)]) -> Hash32 {
    let mut buf = Vec::with_capacity(64 + amounts.len() * 64);
    push_bytes(&mut buf, address.as_bytes());
    buf.extend_from_slice(&(amounts.len() as u32).to_be_bytes());
    for (token, amount) in amounts {
        push_bytes(&mut buf, token.as_bytes());
        buf.extend_from_slice(&amount.to_be_bytes());
    }

    let mut hasher = Sha256::new();
    hasher.update(&buf);
    hasher.finalize().into()
}

fn push_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs<'a>(entries: &[(&'a TokenId, Amount)]) -> Vec<(&'a TokenId, Amount)> {
        entries.to_vec()
    }

    #[test]
    fn deterministic_for_same_entry() {
        let addr = Address::new("0xaa");
        let t1 = TokenId::new("0xt1");
        let a = leaf_hash(&addr, &pairs(&[(&t1, 100)]));
        let b = leaf_hash(&addr, &pairs(&[(&t1, 100)]));
        assert_eq!(a, b);
    }

    #[test]
    fn amount_changes_hash() {
        let addr = Address::new("0xaa");
        let t1 = TokenId::new("0xt1");
        assert_ne!(
            leaf_hash(&addr, &pairs(&[(&t1, 100)])),
            leaf_hash(&addr, &pairs(&[(&t1, 101)]))
        );
    }

    #[test]
    fn length_prefixes_prevent_concatenation_collisions() {
        // ("0xab", "0xc…") must not collide with ("0xa", "bxc…")-style splits
        let a1 = Address::new("0xab");
        let a2 = Address::new("0xa");
        let t1 = TokenId::new("0xt");
        let t2 = TokenId::new("b0xt");
        assert_ne!(
            leaf_hash(&a1, &pairs(&[(&t1, 1)])),
            leaf_hash(&a2, &pairs(&[(&t2, 1)]))
        );
    }
}
