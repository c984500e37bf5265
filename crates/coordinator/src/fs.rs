//! File-backed providers
//!
//! JSON-file implementations of the provider seams, used by the CLI and by
//! air-gapped guardian deployments that receive exported chain state
//! instead of querying a node. Production services implement the same
//! traits against live RPC.

use crate::{BlockTimeProvider, ProviderPaths, RootRegistry, ScheduleProvider, SnapshotProvider};
use anyhow::{anyhow, Context, Result};
use merit_types::{
    BalanceSnapshot, BlockNumber, BoostTable, RegistryView, SourceId, Timestamp, TokenId,
    UnlockSchedule,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reads `<dir>/<source>-<block>.json` snapshot files.
pub struct FileSnapshots {
    dir: PathBuf,
}

impl FileSnapshots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SnapshotProvider for FileSnapshots {
    fn snapshot(&self, source: &SourceId, block: BlockNumber) -> Result<BalanceSnapshot> {
        let path = self.dir.join(format!("{source}-{block}.json"));
        let raw = std::fs::read(&path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("parsing snapshot {}", path.display()))
    }
}

#[derive(Deserialize)]
struct ScheduleFixture {
    source: SourceId,
    token: TokenId,
    schedules: Vec<UnlockSchedule>,
}

/// Loads all unlock schedules from one JSON file at construction.
pub struct FileSchedules {
    schedules: HashMap<(SourceId, TokenId), Vec<UnlockSchedule>>,
}

impl FileSchedules {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("reading schedules {}", path.display()))?;
        let fixtures: Vec<ScheduleFixture> = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing schedules {}", path.display()))?;
        let mut schedules = HashMap::new();
        for fixture in fixtures {
            schedules
                .entry((fixture.source, fixture.token))
                .or_insert_with(Vec::new)
                .extend(fixture.schedules);
        }
        Ok(Self { schedules })
    }
}

impl ScheduleProvider for FileSchedules {
    fn unlock_schedules(
        &self,
        source: &SourceId,
        token: &TokenId,
    ) -> Result<Vec<UnlockSchedule>> {
        Ok(self
            .schedules
            .get(&(source.clone(), token.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Deserialize)]
struct BlockTimeFixture {
    block: BlockNumber,
    timestamp: Timestamp,
}

/// Block timestamps loaded from one JSON file.
pub struct FileBlockTimes {
    times: HashMap<BlockNumber, Timestamp>,
}

impl FileBlockTimes {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("reading block times {}", path.display()))?;
        let fixtures: Vec<BlockTimeFixture> = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing block times {}", path.display()))?;
        Ok(Self {
            times: fixtures
                .into_iter()
                .map(|f| (f.block, f.timestamp))
                .collect(),
        })
    }
}

impl BlockTimeProvider for FileBlockTimes {
    fn block_timestamp(&self, block: BlockNumber) -> Result<Timestamp> {
        self.times
            .get(&block)
            .copied()
            .ok_or_else(|| anyhow!("no timestamp recorded for block {block}"))
    }
}

/// Registry view exported to a JSON file; re-read on every call so a
/// polling job observes submitter updates.
pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RootRegistry for FileRegistry {
    fn view(&self) -> Result<RegistryView> {
        let raw = std::fs::read(&self.path)
            .with_context(|| format!("reading registry {}", self.path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("parsing registry {}", self.path.display()))
    }
}

/// Load an optional boost table; absent path means no boosts.
pub fn load_boosts(path: Option<&Path>) -> Result<BoostTable> {
    let Some(path) = path else {
        return Ok(BoostTable::new());
    };
    let raw = std::fs::read(path)
        .with_context(|| format!("reading boosts {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing boosts {}", path.display()))
}

/// Everything the CLI wires from [`ProviderPaths`].
pub struct FileProviders {
    pub snapshots: FileSnapshots,
    pub schedules: FileSchedules,
    pub block_times: FileBlockTimes,
    pub registry: FileRegistry,
    pub boosts: BoostTable,
}

impl FileProviders {
    pub fn from_paths(paths: &ProviderPaths) -> Result<Self> {
        Ok(Self {
            snapshots: FileSnapshots::new(&paths.snapshots_dir),
            schedules: FileSchedules::load(&paths.schedules_file)?,
            block_times: FileBlockTimes::load(&paths.block_times_file)?,
            registry: FileRegistry::new(&paths.registry_file),
            boosts: load_boosts(paths.boosts_file.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merit_types::{Address, Ratio, SourceKind};

    #[test]
    fn snapshot_files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut snap = BalanceSnapshot::new(
            SourceId::new("pool-a"),
            SourceKind::Native,
            Ratio::one(),
        );
        snap.balances.insert(Address::new("0xaa"), 100);
        std::fs::write(
            dir.path().join("pool-a-500.json"),
            serde_json::to_vec(&snap).unwrap(),
        )
        .unwrap();

        let provider = FileSnapshots::new(dir.path());
        let loaded = provider.snapshot(&SourceId::new("pool-a"), 500).unwrap();
        assert_eq!(loaded, snap);
        assert!(provider.snapshot(&SourceId::new("pool-a"), 501).is_err());
    }

    #[test]
    fn schedules_merge_fixtures_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.json");
        std::fs::write(
            &path,
            serde_json::json!([
                {
                    "source": "pool-a",
                    "token": "0xt",
                    "schedules": [
                        {"initial_locked": 1000, "start_time": 0, "end_time": 100, "duration": 100}
                    ]
                },
                {
                    "source": "pool-a",
                    "token": "0xt",
                    "schedules": [
                        {"initial_locked": 500, "start_time": 100, "end_time": 200, "duration": 100}
                    ]
                }
            ])
            .to_string(),
        )
        .unwrap();

        let provider = FileSchedules::load(&path).unwrap();
        let schedules = provider
            .unlock_schedules(&SourceId::new("pool-a"), &TokenId::new("0xt"))
            .unwrap();
        assert_eq!(schedules.len(), 2);
    }

    #[test]
    fn registry_is_reread_each_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(
            &path,
            serde_json::to_vec(&RegistryView::default()).unwrap(),
        )
        .unwrap();

        let registry = FileRegistry::new(&path);
        assert!(registry.view().unwrap().current.is_none());

        let mut view = RegistryView::default();
        view.current_cycle = 9;
        std::fs::write(&path, serde_json::to_vec(&view).unwrap()).unwrap();
        assert_eq!(registry.view().unwrap().current_cycle, 9);
    }
}
