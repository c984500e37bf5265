//! External collaborator seams
//!
//! Balance snapshots, unlock schedules, block timestamps and the on-chain
//! root registry are environment concerns. The coordinator talks to them
//! through these traits; calls are fallible and may be retried by the
//! caller, never inside the pure pipeline. In-memory implementations back
//! the test suites; file-backed ones live in [`crate::fs`].

use anyhow::{anyhow, Result};
use merit_types::{
    BalanceSnapshot, BlockNumber, RegistryView, RootRecord, SourceId, Timestamp, TokenId,
    UnlockSchedule,
};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Stake weights for a source at a historical block height.
pub trait SnapshotProvider: Send + Sync {
    fn snapshot(&self, source: &SourceId, block: BlockNumber) -> Result<BalanceSnapshot>;
}

/// Unlock schedules for a (source, token) pair, in arbitrary order.
pub trait ScheduleProvider: Send + Sync {
    fn unlock_schedules(&self, source: &SourceId, token: &TokenId)
        -> Result<Vec<UnlockSchedule>>;
}

/// Chain timestamps for block heights.
pub trait BlockTimeProvider: Send + Sync {
    fn block_timestamp(&self, block: BlockNumber) -> Result<Timestamp>;
}

/// Read view of the external root registry.
///
/// The coordinator never writes the registry; propose/approve are emitted
/// as instructions for an external submitter.
pub trait RootRegistry: Send + Sync {
    fn view(&self) -> Result<RegistryView>;
}

/// Wall-clock seam, mockable in tests.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> Timestamp;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Fixed clock for deterministic tests.
pub struct FixedClock(pub RwLock<Timestamp>);

impl FixedClock {
    pub fn at(t: Timestamp) -> Self {
        Self(RwLock::new(t))
    }

    pub fn advance(&self, secs: u64) {
        *self.0.write() += secs;
    }
}

impl Clock for FixedClock {
    fn now_unix(&self) -> Timestamp {
        *self.0.read()
    }
}

// -----------------------------------------------------------------------------
// In-memory implementations
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemorySnapshots {
    snapshots: RwLock<HashMap<(SourceId, BlockNumber), BalanceSnapshot>>,
}

impl InMemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, block: BlockNumber, snapshot: BalanceSnapshot) {
        self.snapshots
            .write()
            .insert((snapshot.source.clone(), block), snapshot);
    }
}

impl SnapshotProvider for InMemorySnapshots {
    fn snapshot(&self, source: &SourceId, block: BlockNumber) -> Result<BalanceSnapshot> {
        self.snapshots
            .read()
            .get(&(source.clone(), block))
            .cloned()
            .ok_or_else(|| anyhow!("no snapshot for {source} at block {block}"))
    }
}

#[derive(Default)]
pub struct InMemorySchedules {
    schedules: RwLock<HashMap<(SourceId, TokenId), Vec<UnlockSchedule>>>,
}

impl InMemorySchedules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, source: SourceId, token: TokenId, schedules: Vec<UnlockSchedule>) {
        self.schedules.write().insert((source, token), schedules);
    }
}

impl ScheduleProvider for InMemorySchedules {
    fn unlock_schedules(
        &self,
        source: &SourceId,
        token: &TokenId,
    ) -> Result<Vec<UnlockSchedule>> {
        // a source may simply not distribute this token
        Ok(self
            .schedules
            .read()
            .get(&(source.clone(), token.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryBlockTimes {
    times: RwLock<HashMap<BlockNumber, Timestamp>>,
}

impl InMemoryBlockTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, block: BlockNumber, timestamp: Timestamp) {
        self.times.write().insert(block, timestamp);
    }
}

impl BlockTimeProvider for InMemoryBlockTimes {
    fn block_timestamp(&self, block: BlockNumber) -> Result<Timestamp> {
        self.times
            .read()
            .get(&block)
            .copied()
            .ok_or_else(|| anyhow!("no timestamp recorded for block {block}"))
    }
}

/// In-memory registry simulating the external root registry plus its
/// submitter: tests apply emitted instructions back onto it.
#[derive(Default)]
pub struct InMemoryRegistry {
    view: RwLock<RegistryView>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a proposed root as pending (the external submitter's effect).
    pub fn record_pending(&self, record: RootRecord) {
        self.view.write().pending = Some(record);
    }

    /// Promote the pending root to current (an approval's effect).
    pub fn promote_pending(&self, approved_at: Timestamp, approved_block: BlockNumber) {
        let mut view = self.view.write();
        if let Some(mut record) = view.pending.take() {
            record.published_at = approved_at;
            record.published_block = approved_block;
            view.current_cycle = record.cycle;
            view.current = Some(record);
        }
    }

    pub fn clear_pending(&self) {
        self.view.write().pending = None;
    }
}

impl RootRegistry for InMemoryRegistry {
    fn view(&self) -> Result<RegistryView> {
        Ok(self.view.read().clone())
    }
}
