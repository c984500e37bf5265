//! Cycle audit records
//!
//! Every run writes a structured account of what was distributed: per-source
//! token totals, emitted entry counts, floor remainders and the dust report.
//! Nothing about a cycle's value flow should only be reconstructable from
//! logs.

use merit_distribution::SourceDistribution;
use merit_ledger::DustReport;
use merit_types::{Amount, BlockNumber, Cycle, SourceId, TokenId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAudit {
    pub source: SourceId,
    pub token: TokenId,
    /// Tokens vested for this source after the allocation split
    pub token_amount: Amount,
    pub entries: usize,
    pub emitted: Amount,
    pub remainder: Amount,
}

impl From<&SourceDistribution> for SourceAudit {
    fn from(dist: &SourceDistribution) -> Self {
        Self {
            source: dist.source.clone(),
            token: dist.token.clone(),
            token_amount: dist.token_amount,
            entries: dist.entries.len(),
            emitted: dist.emitted(),
            remainder: dist.remainder,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleAudit {
    pub network_id: String,
    pub cycle: Cycle,
    pub start_block: BlockNumber,
    pub end_block: BlockNumber,
    pub sources: Vec<SourceAudit>,
    /// Sum of per-address amounts credited this cycle
    pub distributed: Amount,
    pub dust: DustReport,
    /// Total value and address count of the committed cumulative ledger
    pub cumulative_total: Amount,
    pub addresses: usize,
}
