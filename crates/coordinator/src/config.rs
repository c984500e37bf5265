//! Coordinator configuration
//!
//! Loaded from TOML. Provider paths wire the file-backed providers used by
//! the CLI; deployments embedding the coordinator construct providers
//! directly and can ignore them.

use crate::CoordinatorError;
use anyhow::Context;
use merit_distribution::AllocationPolicy;
use merit_types::{Address, Amount, Ratio, SourceId, SourceKind, TokenId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One configured reward source (a yield pool).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: SourceId,
    pub kind: SourceKind,
    /// Tokens this source distributes
    pub tokens: Vec<TokenId>,
}

/// Paths backing the CLI's file providers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProviderPaths {
    pub snapshots_dir: PathBuf,
    pub schedules_file: PathBuf,
    pub block_times_file: PathBuf,
    pub registry_file: PathBuf,
    #[serde(default)]
    pub boosts_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// Network the claim files are keyed under
    pub network_id: String,
    /// Minimum seconds between approved root and the next proposal
    pub min_propose_interval_secs: u64,
    /// Entries at or below this amount are filtered before commitment
    pub dust_threshold: Amount,
    /// Allowed gap between a file's end block and the registry publish block
    pub block_drift_tolerance: u64,
    /// Fraction of each distribution granted to native sources
    pub native_allocation: Ratio,
    /// Directory claim and audit files are written to
    pub store_dir: PathBuf,
    #[serde(default)]
    pub blacklist: Vec<Address>,
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub providers: ProviderPaths,
}

impl RewardsConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: RewardsConfig = toml::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoordinatorError> {
        if self.sources.is_empty() {
            return Err(CoordinatorError::Config(
                "at least one reward source must be configured".into(),
            ));
        }
        if self.network_id.is_empty() {
            return Err(CoordinatorError::Config("network_id must be set".into()));
        }
        // the split must be a proper fraction for its complement to exist
        self.allocation_policy()?;
        Ok(())
    }

    pub fn allocation_policy(&self) -> Result<AllocationPolicy, CoordinatorError> {
        AllocationPolicy::from_native_share(self.native_allocation).map_err(|e| {
            CoordinatorError::Config(format!("invalid native_allocation: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
            network_id = "testnet"
            min_propose_interval_secs = 3600
            dust_threshold = 10
            block_drift_tolerance = 6500
            native_allocation = { numer = 1, denom = 2 }
            store_dir = "/tmp/merit-store"
            blacklist = ["0xdead"]

            [[sources]]
            id = "pool-native"
            kind = "native"
            tokens = ["0xaaa"]

            [[sources]]
            id = "pool-other"
            kind = "non-native"
            tokens = ["0xaaa", "0xbbb"]

            [providers]
            snapshots_dir = "fixtures/snapshots"
            schedules_file = "fixtures/schedules.json"
            block_times_file = "fixtures/blocks.json"
            registry_file = "fixtures/registry.json"
        "#
    }

    #[test]
    fn parses_full_config() {
        let config: RewardsConfig = toml::from_str(sample_toml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].kind, SourceKind::NonNative);
        assert_eq!(config.blacklist, vec![Address::new("0xdead")]);
    }

    #[test]
    fn rejects_empty_sources() {
        let config = RewardsConfig {
            sources: Vec::new(),
            ..toml::from_str(sample_toml()).unwrap()
        };
        assert!(matches!(
            config.validate(),
            Err(CoordinatorError::Config(_))
        ));
    }

    #[test]
    fn rejects_improper_split() {
        let mut config: RewardsConfig = toml::from_str(sample_toml()).unwrap();
        config.native_allocation = Ratio::new(3, 2).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_denominator_cannot_deserialize() {
        let bad = sample_toml().replace("denom = 2", "denom = 0");
        assert!(toml::from_str::<RewardsConfig>(&bad).is_err());
    }
}
