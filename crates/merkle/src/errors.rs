use thiserror::Error;

#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("cannot commit an empty ledger")]
    EmptyTree,
    #[error("invalid leaf index {index} for {leaves} leaves")]
    InvalidIndex { index: usize, leaves: usize },
    #[error("failed to serialize claim file: {0}")]
    Serialization(#[from] serde_json::Error),
}
