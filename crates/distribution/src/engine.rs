//! Per-source distribution for one cycle window

use crate::{AllocationPolicy, DistributionError};
use merit_types::{
    mul_div_floor, Amount, BalanceSnapshot, RewardEntry, SourceId, Timestamp, TokenId,
    UnlockSchedule,
};
use merit_vesting::distributed_in_range;
use tracing::{debug, warn};

/// Outcome of distributing one token for one source over one window.
///
/// `remainder` is the floor-rounding loss (plus the whole amount when no
/// address carries weight). It is accounted here and reported upstream,
/// never redistributed at this layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDistribution {
    pub source: SourceId,
    pub token: TokenId,
    /// Tokens released for this source after the allocation split
    pub token_amount: Amount,
    pub entries: Vec<RewardEntry>,
    pub remainder: Amount,
}

impl SourceDistribution {
    fn empty(source: SourceId, token: TokenId) -> Self {
        Self {
            source,
            token,
            token_amount: 0,
            entries: Vec::new(),
            remainder: 0,
        }
    }

    /// Sum of the emitted per-address amounts.
    pub fn emitted(&self) -> Amount {
        self.entries.iter().map(|e| e.amount).sum()
    }
}

/// Distribute one token's vested amount across a snapshot's weights.
///
/// The vested amount for `(t0, t1]` is scaled by the allocation policy for
/// the snapshot's source kind before the per-address split. Each address
/// with positive weight receives `floor(weight * token_amount /
/// total_weight)`; the emitted sum never exceeds `token_amount`, and the
/// difference (bounded by the number of recipients) lands in `remainder`.
pub fn distribute(
    snapshot: &BalanceSnapshot,
    schedules: &[UnlockSchedule],
    token: &TokenId,
    t0: Timestamp,
    t1: Timestamp,
    policy: &AllocationPolicy,
) -> Result<SourceDistribution, DistributionError> {
    let vested = distributed_in_range(schedules, t0, t1)?;
    let token_amount = policy.ratio_for(snapshot.kind).apply(vested)?;

    if token_amount == 0 {
        // Exhausted or not-yet-started schedules are a normal outcome
        debug!(
            target: "distribution",
            "{}: nothing vested for {} in ({}, {}]",
            snapshot.source, token, t0, t1
        );
        return Ok(SourceDistribution::empty(snapshot.source.clone(), token.clone()));
    }

    let total_weight =
        snapshot
            .total_weight()
            .ok_or_else(|| DistributionError::WeightOverflow {
                source_id: snapshot.source.to_string(),
            })?;

    if total_weight == 0 {
        warn!(
            target: "distribution",
            "{}: {} units of {} vested but no weighted addresses; tracking as remainder",
            snapshot.source, token_amount, token
        );
        return Ok(SourceDistribution {
            source: snapshot.source.clone(),
            token: token.clone(),
            token_amount,
            entries: Vec::new(),
            remainder: token_amount,
        });
    }

    let mut entries = Vec::with_capacity(snapshot.len());
    let mut emitted: Amount = 0;
    for (address, weight) in &snapshot.balances {
        if *weight == 0 {
            continue;
        }
        let amount = mul_div_floor(*weight, token_amount, total_weight).ok_or_else(|| {
            DistributionError::AmountOverflow {
                source_id: snapshot.source.to_string(),
            }
        })?;
        if amount > 0 {
            emitted += amount;
            entries.push(RewardEntry::new(address.clone(), token.clone(), amount));
        }
    }

    let remainder = token_amount - emitted;
    debug!(
        target: "distribution",
        "{}: distributed {} of {} {} across {} addresses, remainder {}",
        snapshot.source,
        emitted,
        token_amount,
        token,
        entries.len(),
        remainder
    );

    Ok(SourceDistribution {
        source: snapshot.source.clone(),
        token: token.clone(),
        token_amount,
        entries,
        remainder,
    })
}
