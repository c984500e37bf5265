//! Per-cycle reward grants

use crate::{Address, Amount, TokenId};
use serde::{Deserialize, Serialize};

/// One `(address, token) -> amount` grant inside a single source's per-cycle
/// distribution. Amounts are non-negative fixed-point integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    pub address: Address,
    pub token: TokenId,
    pub amount: Amount,
}

impl RewardEntry {
    pub fn new(address: Address, token: TokenId, amount: Amount) -> Self {
        Self {
            address,
            token,
            amount,
        }
    }
}
