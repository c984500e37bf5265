//! Per-cycle and cumulative reward ledgers

use crate::LedgerError;
use merit_types::{Address, Amount, ClaimFile, Cycle, RewardEntry, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// `address -> token -> amount` accumulator.
///
/// `BTreeMap` keys give the canonical (lexicographic) ordering the Merkle
/// committer depends on: iterating a ledger is a pure function of its
/// contents, never of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLedger {
    pub cycle: Cycle,
    pub entries: BTreeMap<Address, BTreeMap<TokenId, Amount>>,
}

/// Value removed by a dust pass — tracked and reported, never lost silently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DustReport {
    pub threshold: Amount,
    pub removed_entries: usize,
    pub removed_value: Amount,
}

impl RewardLedger {
    pub fn new(cycle: Cycle) -> Self {
        Self {
            cycle,
            entries: BTreeMap::new(),
        }
    }

    /// Add one grant; same-key amounts are summed.
    pub fn credit(
        &mut self,
        address: Address,
        token: TokenId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let slot = self
            .entries
            .entry(address.clone())
            .or_default()
            .entry(token.clone())
            .or_insert(0);
        *slot = slot
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { address, token })?;
        Ok(())
    }

    /// Merge one source's per-cycle entries.
    pub fn add_entries(&mut self, entries: &[RewardEntry]) -> Result<(), LedgerError> {
        for entry in entries {
            self.credit(entry.address.clone(), entry.token.clone(), entry.amount)?;
        }
        Ok(())
    }

    /// Current amount for a key, zero when absent.
    pub fn amount_of(&self, address: &Address, token: &TokenId) -> Amount {
        self.entries
            .get(address)
            .and_then(|tokens| tokens.get(token))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate `(address, token, amount)` in canonical order.
    pub fn amounts(&self) -> impl Iterator<Item = (&Address, &TokenId, Amount)> {
        self.entries.iter().flat_map(|(addr, tokens)| {
            tokens.iter().map(move |(token, amount)| (addr, token, *amount))
        })
    }

    /// Total committed value; `None` on overflow.
    pub fn total_value(&self) -> Option<Amount> {
        self.amounts()
            .try_fold(0u128, |acc, (_, _, amount)| acc.checked_add(amount))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of addresses with at least one entry.
    pub fn address_count(&self) -> usize {
        self.entries.len()
    }

    /// Remove entries at or below `threshold`.
    ///
    /// Applied exactly once, after the cumulative merge — a per-source dust
    /// pass would drop value instead of carrying it forward across cycles.
    pub fn filter_dust(&self, threshold: Amount) -> (RewardLedger, DustReport) {
        let mut filtered = RewardLedger::new(self.cycle);
        let mut report = DustReport {
            threshold,
            ..Default::default()
        };

        for (address, token, amount) in self.amounts() {
            if amount <= threshold {
                report.removed_entries += 1;
                report.removed_value = report.removed_value.saturating_add(amount);
            } else {
                filtered
                    .entries
                    .entry(address.clone())
                    .or_default()
                    .insert(token.clone(), amount);
            }
        }

        if report.removed_entries > 0 {
            info!(
                target: "ledger",
                "dust filter removed {} entries worth {} (threshold {})",
                report.removed_entries, report.removed_value, threshold
            );
        }
        (filtered, report)
    }

    /// Rebuild the cumulative ledger recorded in a claim file.
    pub fn from_claim(file: &ClaimFile) -> Result<Self, LedgerError> {
        let mut ledger = RewardLedger::new(file.cycle);
        for (address, entry) in &file.entries {
            if entry.tokens.len() != entry.cumulative_amounts.len() {
                return Err(LedgerError::MalformedClaimEntry {
                    address: address.clone(),
                    tokens: entry.tokens.len(),
                    amounts: entry.cumulative_amounts.len(),
                });
            }
            for (token, amount) in entry.tokens.iter().zip(&entry.cumulative_amounts) {
                ledger.credit(address.clone(), token.clone(), *amount)?;
            }
        }
        Ok(ledger)
    }

    /// Per-key sum of two ledgers; missing keys default to zero.
    ///
    /// Pure function of the two inputs — identical inputs produce
    /// byte-identical output, which is what lets the updater and guardian
    /// recompute independently and compare roots.
    pub fn merged_with(&self, other: &RewardLedger, cycle: Cycle) -> Result<Self, LedgerError> {
        let mut merged = self.clone();
        merged.cycle = cycle;
        for (address, token, amount) in other.amounts() {
            merged.credit(address.clone(), token.clone(), amount)?;
        }
        Ok(merged)
    }
}

/// Merge a cycle's grants into the previous all-time cumulative ledger.
pub fn merge_cumulative(
    previous: &RewardLedger,
    cycle_ledger: &RewardLedger,
    next_cycle: Cycle,
) -> Result<RewardLedger, LedgerError> {
    let merged = previous.merged_with(cycle_ledger, next_cycle)?;
    debug!(
        target: "ledger",
        "cycle {}: merged {} cycle entries into {} cumulative addresses",
        next_cycle,
        cycle_ledger.address_count(),
        merged.address_count()
    );
    Ok(merged)
}
