//! Merit Merkle commitment
//!
//! Builds a deterministic binary Merkle tree over a cumulative reward
//! ledger and produces the root, per-leaf proofs and the content-addressed
//! claim file. Recomputing a commitment over bit-identical ledger contents
//! yields a bit-identical root — the determinism the dual-role verification
//! protocol depends on.

pub mod committer;
pub mod errors;
pub mod leaf;
pub mod tree;

pub use committer::*;
pub use errors::*;
pub use leaf::*;
pub use tree::*;
