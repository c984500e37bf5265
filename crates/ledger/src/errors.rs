use merit_types::{Address, TokenId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("amount overflow crediting {token} to {address}")]
    Overflow { address: Address, token: TokenId },
    #[error("ledger total overflows")]
    TotalOverflow,
    #[error("cumulative amount decreased for {token} of {address}: {previous} -> {current}")]
    NonMonotonic {
        address: Address,
        token: TokenId,
        previous: u128,
        current: u128,
    },
    #[error("ledger total mismatch: expected {expected}, found {actual}")]
    TotalMismatch { expected: u128, actual: u128 },
    #[error("claim entry for {address} has {tokens} tokens but {amounts} amounts")]
    MalformedClaimEntry {
        address: Address,
        tokens: usize,
        amounts: usize,
    },
}
