use crate::CyclePhase;
use merit_distribution::DistributionError;
use merit_ledger::LedgerError;
use merit_merkle::MerkleError;
use merit_types::{BlockNumber, Cycle, RatioError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    // --- precondition violations: abort before any external side effect ---
    #[error("a proposed root is already pending for cycle {cycle}")]
    ProposalPending { cycle: Cycle },
    #[error("empty block range: end block {end} must exceed start block {start}")]
    EmptyRange { start: BlockNumber, end: BlockNumber },
    #[error(
        "range ({start}, {end}] is not contiguous with the recorded end block {previous_end}"
    )]
    NonContiguousRange {
        start: BlockNumber,
        end: BlockNumber,
        previous_end: BlockNumber,
    },
    #[error(
        "requested range ({rs}, {re}] does not match the pending declared range ({ds}, {de}]",
        rs = .requested.0, re = .requested.1, ds = .declared.0, de = .declared.1
    )]
    DeclaredRangeMismatch {
        requested: (BlockNumber, BlockNumber),
        declared: (BlockNumber, BlockNumber),
    },
    #[error("configuration error: {0}")]
    Config(String),

    // --- staleness / tamper: alert and stop, never auto-correct ---
    #[error("recorded claim file root {file_root} does not match registry root {registry_root}")]
    TamperDetected {
        file_root: String,
        registry_root: String,
    },
    #[error(
        "recorded end block {file_end} is ahead of the registry publish block {publish_block}"
    )]
    LedgerAheadOfRegistry {
        file_end: BlockNumber,
        publish_block: BlockNumber,
    },
    #[error(
        "recorded end block {file_end} trails the registry publish block {publish_block} beyond tolerance {tolerance}"
    )]
    StaleLedger {
        file_end: BlockNumber,
        publish_block: BlockNumber,
        tolerance: u64,
    },

    // --- verification mismatch: rejected state, never approved ---
    #[error("guardian root mismatch for cycle {cycle}: recomputed {computed}, pending {pending}")]
    RootMismatch {
        cycle: Cycle,
        computed: String,
        pending: String,
    },
    #[error(
        "content hash mismatch for cycle {cycle}: recomputed {computed}, recorded {recorded}"
    )]
    ContentHashMismatch {
        cycle: Cycle,
        computed: String,
        recorded: String,
    },

    #[error("illegal cycle state transition {from:?} -> {to:?}")]
    IllegalTransition { from: CyclePhase, to: CyclePhase },

    // --- pure pipeline failures ---
    #[error(transparent)]
    Distribution(#[from] DistributionError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Merkle(#[from] MerkleError),
    #[error(transparent)]
    Ratio(#[from] RatioError),

    // --- transient external I/O: retryable at the caller boundary ---
    #[error("provider failure: {0}")]
    Provider(#[from] anyhow::Error),
}

impl CoordinatorError {
    /// Only external I/O failures may be retried; every protocol error is
    /// terminal for the attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoordinatorError::Provider(_))
    }
}
