//! The per-cycle computation pipeline
//!
//! Snapshot weighting, vesting distribution, cumulative merge, dust filter
//! and Merkle commitment for one block range. Given identical provider
//! responses and an identical previous ledger, the result is bit-identical —
//! that determinism is what the updater and guardian compare.

use crate::{
    BlockTimeProvider, CoordinatorError, CycleAudit, RewardsConfig, ScheduleProvider,
    SnapshotProvider, SourceAudit,
};
use merit_distribution::{distribute, AllocationPolicy, SourceDistribution};
use merit_ledger::{merge_cumulative, verify_cumulative, verify_dust, LedgerError, RewardLedger};
use merit_merkle::{commit, Commitment};
use merit_types::{Amount, BlockNumber, BoostTable, Cycle, SourceKind};
use tracing::{debug, info};

/// Result of one pipeline run: the commitment to publish and the audit
/// record accounting for every unit of value it moved.
#[derive(Clone, Debug)]
pub struct CycleComputation {
    pub commitment: Commitment,
    pub audit: CycleAudit,
}

pub struct CyclePipeline<'a> {
    config: &'a RewardsConfig,
    policy: AllocationPolicy,
    boosts: &'a BoostTable,
    snapshots: &'a dyn SnapshotProvider,
    schedules: &'a dyn ScheduleProvider,
    block_times: &'a dyn BlockTimeProvider,
}

impl<'a> CyclePipeline<'a> {
    pub fn new(
        config: &'a RewardsConfig,
        boosts: &'a BoostTable,
        snapshots: &'a dyn SnapshotProvider,
        schedules: &'a dyn ScheduleProvider,
        block_times: &'a dyn BlockTimeProvider,
    ) -> Result<Self, CoordinatorError> {
        Ok(Self {
            policy: config.allocation_policy()?,
            config,
            boosts,
            snapshots,
            schedules,
            block_times,
        })
    }

    /// Compute the committed cumulative ledger for `(start_block, end_block]`.
    ///
    /// Any provider failure aborts the whole attempt; no partial ledger
    /// ever leaves this function.
    pub fn compute(
        &self,
        cycle: Cycle,
        start_block: BlockNumber,
        end_block: BlockNumber,
        previous: &RewardLedger,
    ) -> Result<CycleComputation, CoordinatorError> {
        let t0 = self.block_times.block_timestamp(start_block)?;
        let t1 = self.block_times.block_timestamp(end_block)?;

        info!(
            target: "pipeline",
            "cycle {}: computing rewards for {} blocks: {} -> {}",
            cycle,
            end_block - start_block,
            start_block,
            end_block
        );

        let mut cycle_ledger = RewardLedger::new(cycle);
        let mut source_audits: Vec<SourceAudit> = Vec::new();
        let mut distributed: Amount = 0;

        for source in &self.config.sources {
            let snapshot = self
                .snapshots
                .snapshot(&source.id, end_block)?
                .without(&self.config.blacklist)
                .scaled()?;
            // boost multipliers apply to non-native sources only
            let snapshot = match source.kind {
                SourceKind::NonNative => snapshot.boosted(self.boosts)?,
                SourceKind::Native => snapshot,
            };

            for token in &source.tokens {
                let schedules = self.schedules.unlock_schedules(&source.id, token)?;
                let dist: SourceDistribution =
                    distribute(&snapshot, &schedules, token, t0, t1, &self.policy)?;
                distributed = distributed
                    .checked_add(dist.emitted())
                    .ok_or(LedgerError::TotalOverflow)?;
                cycle_ledger.add_entries(&dist.entries)?;
                source_audits.push((&dist).into());
            }
        }

        debug!(
            target: "pipeline",
            "cycle {}: {} credited across {} addresses this cycle",
            cycle,
            distributed,
            cycle_ledger.address_count()
        );

        let merged = merge_cumulative(previous, &cycle_ledger, cycle)?;
        verify_cumulative(previous, &merged, distributed)?;

        let (filtered, dust) = merged.filter_dust(self.config.dust_threshold);
        verify_dust(&merged, &filtered, &dust)?;
        let cumulative_total = filtered
            .total_value()
            .ok_or(LedgerError::TotalOverflow)?;

        let commitment = commit(&filtered, &self.config.network_id, start_block, end_block)?;

        let audit = CycleAudit {
            network_id: self.config.network_id.clone(),
            cycle,
            start_block,
            end_block,
            sources: source_audits,
            distributed,
            dust,
            cumulative_total,
            addresses: filtered.address_count(),
        };

        Ok(CycleComputation { commitment, audit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryBlockTimes, InMemorySchedules, InMemorySnapshots};
    use merit_types::{
        Address, BalanceSnapshot, Ratio, SourceId, TokenId, UnlockSchedule,
    };

    fn test_config() -> RewardsConfig {
        toml::from_str(
            r#"
                network_id = "testnet"
                min_propose_interval_secs = 0
                dust_threshold = 0
                block_drift_tolerance = 6500
                native_allocation = { numer = 1, denom = 1 }
                store_dir = "/tmp/merit-test"

                [[sources]]
                id = "pool-a"
                kind = "native"
                tokens = ["0xt"]
            "#,
        )
        .unwrap()
    }

    fn world() -> (InMemorySnapshots, InMemorySchedules, InMemoryBlockTimes) {
        let snapshots = InMemorySnapshots::new();
        let mut snap = BalanceSnapshot::new(
            SourceId::new("pool-a"),
            merit_types::SourceKind::Native,
            Ratio::one(),
        );
        snap.balances.insert(Address::new("0xa"), 100);
        snap.balances.insert(Address::new("0xb"), 300);
        snapshots.insert(500, snap);

        let schedules = InMemorySchedules::new();
        schedules.insert(
            SourceId::new("pool-a"),
            TokenId::new("0xt"),
            vec![UnlockSchedule {
                initial_locked: 4000,
                start_time: 0,
                end_time: 1000,
                duration: 1000,
            }],
        );

        let block_times = InMemoryBlockTimes::new();
        block_times.insert(0, 0);
        block_times.insert(500, 500);
        (snapshots, schedules, block_times)
    }

    #[test]
    fn end_to_end_scenario() {
        // snapshot {A:100, B:300}, 2000 vested over (0, 500] => A=500, B=1500
        let config = test_config();
        let boosts = BoostTable::new();
        let (snapshots, schedules, block_times) = world();
        let pipeline =
            CyclePipeline::new(&config, &boosts, &snapshots, &schedules, &block_times)
                .unwrap();

        let result = pipeline
            .compute(1, 0, 500, &RewardLedger::new(0))
            .unwrap();

        let ledger =
            RewardLedger::from_claim(&result.commitment.claim_file).unwrap();
        assert_eq!(ledger.amount_of(&Address::new("0xa"), &TokenId::new("0xt")), 500);
        assert_eq!(ledger.amount_of(&Address::new("0xb"), &TokenId::new("0xt")), 1500);
        assert_eq!(result.audit.distributed, 2000);
        assert_eq!(result.audit.sources.len(), 1);
        assert_eq!(result.audit.dust.removed_value, 0);
    }

    #[test]
    fn recomputation_is_bit_identical() {
        let config = test_config();
        let boosts = BoostTable::new();
        let (snapshots, schedules, block_times) = world();
        let pipeline =
            CyclePipeline::new(&config, &boosts, &snapshots, &schedules, &block_times)
                .unwrap();

        let previous = RewardLedger::new(0);
        let a = pipeline.compute(1, 0, 500, &previous).unwrap();
        let b = pipeline.compute(1, 0, 500, &previous).unwrap();
        assert_eq!(a.commitment.merkle_root, b.commitment.merkle_root);
        assert_eq!(a.commitment.content_hash, b.commitment.content_hash);
    }

    #[test]
    fn missing_snapshot_aborts_attempt() {
        let config = test_config();
        let boosts = BoostTable::new();
        let (_, schedules, block_times) = world();
        let empty_snapshots = InMemorySnapshots::new();
        let pipeline = CyclePipeline::new(
            &config,
            &boosts,
            &empty_snapshots,
            &schedules,
            &block_times,
        )
        .unwrap();

        let err = pipeline
            .compute(1, 0, 500, &RewardLedger::new(0))
            .unwrap_err();
        assert!(err.is_transient());
    }
}
