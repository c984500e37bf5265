//! Root updater and guardian triggers
//!
//! Both roles run the same pure pipeline; what differs is when they run and
//! what they do with the result. The updater rate-limits itself against the
//! last approved root and emits a propose instruction; the guardian runs
//! only against an existing pending record, recomputes the declared range
//! and either emits an approve instruction or rejects with an alert. Mutual
//! exclusion is carried by the external pending-root record, never by local
//! state, because the roles may not share a process.

use crate::{
    BlockTimeProvider, Clock, CoordinatorError, CyclePhase, CyclePipeline,
    CycleStateMachine, RewardsConfig, RootRegistry, ScheduleProvider, SnapshotProvider,
    TreeStore,
};
use merit_ledger::RewardLedger;
use merit_types::{
    hash_to_hex, BlockNumber, BoostTable, Cycle, Hash32, RegistryView, RootRecord,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Arguments for the external registry submitter's `propose` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeInstruction {
    #[serde(with = "merit_types::serde_hex32")]
    pub merkle_root: Hash32,
    #[serde(with = "merit_types::serde_hex32")]
    pub content_hash: Hash32,
    pub cycle: Cycle,
    pub start_block: BlockNumber,
    pub end_block: BlockNumber,
}

/// Arguments for the external registry submitter's `approve` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveInstruction {
    #[serde(with = "merit_types::serde_hex32")]
    pub merkle_root: Hash32,
    #[serde(with = "merit_types::serde_hex32")]
    pub content_hash: Hash32,
    pub cycle: Cycle,
    pub start_block: BlockNumber,
    pub end_block: BlockNumber,
}

/// A normal "skip this run" outcome, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Too little time has passed since the last approved root
    TooRecent { elapsed: u64, required: u64 },
    /// Nothing for the guardian to verify
    NoPendingRoot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdaterOutcome {
    Skipped(SkipReason),
    Proposed(ProposeInstruction),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardianOutcome {
    Skipped(SkipReason),
    Approved(ApproveInstruction),
}

pub struct RootCoordinator {
    config: RewardsConfig,
    boosts: BoostTable,
    snapshots: Arc<dyn SnapshotProvider>,
    schedules: Arc<dyn ScheduleProvider>,
    block_times: Arc<dyn BlockTimeProvider>,
    registry: Arc<dyn RootRegistry>,
    store: Arc<dyn TreeStore>,
    clock: Arc<dyn Clock>,
}

impl RootCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RewardsConfig,
        boosts: BoostTable,
        snapshots: Arc<dyn SnapshotProvider>,
        schedules: Arc<dyn ScheduleProvider>,
        block_times: Arc<dyn BlockTimeProvider>,
        registry: Arc<dyn RootRegistry>,
        store: Arc<dyn TreeStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CoordinatorError> {
        config.validate()?;
        Ok(Self {
            config,
            boosts,
            snapshots,
            schedules,
            block_times,
            registry,
            store,
            clock,
        })
    }

    /// Root updater trigger.
    ///
    /// Rate-limit holds return `Skipped`, not an error; a pending proposal
    /// or a tamper/staleness finding aborts before any side effect.
    pub fn run_updater(
        &self,
        start_block: BlockNumber,
        end_block: BlockNumber,
    ) -> Result<UpdaterOutcome, CoordinatorError> {
        info!(target: "coordinator", "===== root updater =====");
        let view = self.registry.view()?;

        if let Some(pending) = &view.pending {
            return Err(CoordinatorError::ProposalPending {
                cycle: pending.cycle,
            });
        }

        let (previous, current) = self.load_previous(&view)?;

        if let Some(current) = &current {
            let elapsed = self.clock.now_unix().saturating_sub(current.published_at);
            if elapsed < self.config.min_propose_interval_secs {
                warn!(
                    target: "coordinator",
                    "last publish too recent: {}s of {}s required",
                    elapsed, self.config.min_propose_interval_secs
                );
                return Ok(UpdaterOutcome::Skipped(SkipReason::TooRecent {
                    elapsed,
                    required: self.config.min_propose_interval_secs,
                }));
            }
        }

        validate_range(start_block, end_block, current.as_ref())?;

        let cycle = view.next_cycle();
        let mut state = CycleStateMachine::new(cycle);
        state.transition(CyclePhase::Computing)?;

        let computation = self
            .pipeline()?
            .compute(cycle, start_block, end_block, &previous)?;

        let stored_hash = self.store.save(&computation.commitment.claim_file)?;
        ensure_content_hash(cycle, stored_hash, computation.commitment.content_hash)?;
        self.store.save_audit(&computation.audit)?;

        state.transition(CyclePhase::ProposedPending)?;
        info!(
            target: "coordinator",
            "cycle {}: proposing root {}",
            cycle,
            hash_to_hex(&computation.commitment.merkle_root)
        );

        Ok(UpdaterOutcome::Proposed(ProposeInstruction {
            merkle_root: computation.commitment.merkle_root,
            content_hash: computation.commitment.content_hash,
            cycle,
            start_block,
            end_block,
        }))
    }

    /// Guardian trigger.
    ///
    /// Recomputes the pending record's declared range and compares roots.
    /// An exact match emits an approve instruction; any mismatch is a fatal
    /// rejection — no retry policy may approve a non-matching root. When an
    /// expected range is given, it must equal the declared one.
    pub fn run_guardian(
        &self,
        expected_range: Option<(BlockNumber, BlockNumber)>,
    ) -> Result<GuardianOutcome, CoordinatorError> {
        info!(target: "coordinator", "===== guardian =====");
        let view = self.registry.view()?;

        let Some(pending) = view.pending else {
            warn!(target: "coordinator", "no pending root to verify");
            return Ok(GuardianOutcome::Skipped(SkipReason::NoPendingRoot));
        };

        if let Some(requested) = expected_range {
            let declared = (pending.start_block, pending.end_block);
            if requested != declared {
                return Err(CoordinatorError::DeclaredRangeMismatch {
                    requested,
                    declared,
                });
            }
        }

        let (previous, current) = self.load_previous(&view)?;
        validate_range(pending.start_block, pending.end_block, current.as_ref())?;

        let mut state = CycleStateMachine::new(pending.cycle);
        state.transition(CyclePhase::Computing)?;

        let computation = self.pipeline()?.compute(
            pending.cycle,
            pending.start_block,
            pending.end_block,
            &previous,
        )?;

        if computation.commitment.merkle_root != pending.merkle_root {
            state.transition(CyclePhase::Rejected)?;
            error!(
                target: "coordinator",
                "DISCREPANCY: cycle {} recomputed root {} does not match pending {}",
                pending.cycle,
                hash_to_hex(&computation.commitment.merkle_root),
                hash_to_hex(&pending.merkle_root)
            );
            return Err(CoordinatorError::RootMismatch {
                cycle: pending.cycle,
                computed: hash_to_hex(&computation.commitment.merkle_root),
                pending: hash_to_hex(&pending.merkle_root),
            });
        }

        if computation.commitment.content_hash != pending.content_hash {
            state.transition(CyclePhase::Rejected)?;
            error!(
                target: "coordinator",
                "DISCREPANCY: cycle {} recomputed content hash {} does not match pending {}",
                pending.cycle,
                hash_to_hex(&computation.commitment.content_hash),
                hash_to_hex(&pending.content_hash)
            );
            return Err(CoordinatorError::ContentHashMismatch {
                cycle: pending.cycle,
                computed: hash_to_hex(&computation.commitment.content_hash),
                recorded: hash_to_hex(&pending.content_hash),
            });
        }

        let stored_hash = self.store.save(&computation.commitment.claim_file)?;
        ensure_content_hash(pending.cycle, stored_hash, pending.content_hash)?;
        self.store.save_audit(&computation.audit)?;

        state.transition(CyclePhase::Approved)?;
        info!(
            target: "coordinator",
            "cycle {}: roots match, approving {}",
            pending.cycle,
            hash_to_hex(&pending.merkle_root)
        );

        Ok(GuardianOutcome::Approved(ApproveInstruction {
            merkle_root: pending.merkle_root,
            content_hash: pending.content_hash,
            cycle: pending.cycle,
            start_block: pending.start_block,
            end_block: pending.end_block,
        }))
    }

    fn pipeline(&self) -> Result<CyclePipeline<'_>, CoordinatorError> {
        CyclePipeline::new(
            &self.config,
            &self.boosts,
            self.snapshots.as_ref(),
            self.schedules.as_ref(),
            self.block_times.as_ref(),
        )
    }

    /// Rebuild the previous cumulative ledger and run the tamper and
    /// freshness checks against the registry's current record. A registry
    /// with no current root is the genesis case: an empty previous ledger.
    fn load_previous(
        &self,
        view: &RegistryView,
    ) -> Result<(RewardLedger, Option<RootRecord>), CoordinatorError> {
        let Some(current) = view.current else {
            info!(target: "coordinator", "no published root yet, starting from an empty ledger");
            return Ok((RewardLedger::new(0), None));
        };

        let file = self.store.load(&current.content_hash)?;

        if file.merkle_root != current.merkle_root {
            return Err(CoordinatorError::TamperDetected {
                file_root: hash_to_hex(&file.merkle_root),
                registry_root: hash_to_hex(&current.merkle_root),
            });
        }
        // the publish must postdate the range the file tracks...
        if current.published_block < file.end_block {
            return Err(CoordinatorError::LedgerAheadOfRegistry {
                file_end: file.end_block,
                publish_block: current.published_block,
            });
        }
        // ...but not by more than the freshness tolerance
        if current.published_block - file.end_block > self.config.block_drift_tolerance {
            return Err(CoordinatorError::StaleLedger {
                file_end: file.end_block,
                publish_block: current.published_block,
                tolerance: self.config.block_drift_tolerance,
            });
        }

        let ledger = RewardLedger::from_claim(&file)?;
        Ok((ledger, Some(current)))
    }
}

fn validate_range(
    start: BlockNumber,
    end: BlockNumber,
    current: Option<&RootRecord>,
) -> Result<(), CoordinatorError> {
    if end <= start {
        return Err(CoordinatorError::EmptyRange { start, end });
    }
    if let Some(current) = current {
        if start != current.end_block {
            return Err(CoordinatorError::NonContiguousRange {
                start,
                end,
                previous_end: current.end_block,
            });
        }
    }
    Ok(())
}

fn ensure_content_hash(
    cycle: Cycle,
    stored: Hash32,
    expected: Hash32,
) -> Result<(), CoordinatorError> {
    if stored != expected {
        return Err(CoordinatorError::ContentHashMismatch {
            cycle,
            computed: hash_to_hex(&stored),
            recorded: hash_to_hex(&expected),
        });
    }
    Ok(())
}
