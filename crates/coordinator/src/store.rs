//! Content-addressed claim file store
//!
//! Claim files are stored under their blake3 content hash, so substituting
//! a file changes the address it is found under; `load` recomputes the hash
//! and refuses mismatched content outright.

use crate::CycleAudit;
use anyhow::{bail, Context, Result};
use merit_types::{ClaimFile, Hash32};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub trait TreeStore: Send + Sync {
    /// Load and verify a claim file by content hash.
    fn load(&self, content_hash: &Hash32) -> Result<ClaimFile>;

    /// Persist a claim file; returns its content hash.
    fn save(&self, file: &ClaimFile) -> Result<Hash32>;

    /// Persist a cycle audit beside the claim file.
    fn save_audit(&self, audit: &CycleAudit) -> Result<()>;
}

fn content_hash_of(file: &ClaimFile) -> Result<Hash32> {
    Ok(blake3::hash(&file.canonical_bytes()?).into())
}

/// Store writing `rewards-<network>-<hash>.json` files to a directory.
pub struct FileTreeStore {
    dir: PathBuf,
}

impl FileTreeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn claim_path(&self, network_id: &str, content_hash: &Hash32) -> PathBuf {
        self.dir
            .join(format!("rewards-{network_id}-0x{}.json", hex::encode(content_hash)))
    }

    fn audit_path(&self, audit: &CycleAudit) -> PathBuf {
        self.dir
            .join(format!("audit-{}-{}.json", audit.network_id, audit.cycle))
    }

    fn find_claim(&self, content_hash: &Hash32) -> Result<PathBuf> {
        let suffix = format!("-0x{}.json", hex::encode(content_hash));
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("reading store directory {}", self.dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("rewards-") && n.ends_with(&suffix))
            {
                return Ok(path);
            }
        }
        bail!(
            "no claim file stored for content hash 0x{}",
            hex::encode(content_hash)
        )
    }
}

impl TreeStore for FileTreeStore {
    fn load(&self, content_hash: &Hash32) -> Result<ClaimFile> {
        let path = self.find_claim(content_hash)?;
        let raw = std::fs::read(&path)
            .with_context(|| format!("reading claim file {}", path.display()))?;
        let file: ClaimFile = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing claim file {}", path.display()))?;

        let actual = content_hash_of(&file)?;
        if actual != *content_hash {
            bail!(
                "claim file {} content hash mismatch: expected 0x{}, found 0x{}",
                path.display(),
                hex::encode(content_hash),
                hex::encode(actual)
            );
        }
        Ok(file)
    }

    fn save(&self, file: &ClaimFile) -> Result<Hash32> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating store directory {}", self.dir.display()))?;
        let content_hash = content_hash_of(file)?;
        let path = self.claim_path(&file.network_id, &content_hash);
        std::fs::write(&path, file.canonical_bytes()?)
            .with_context(|| format!("writing claim file {}", path.display()))?;
        info!(
            target: "store",
            "cycle {}: wrote claim file {}",
            file.cycle,
            path.display()
        );
        Ok(content_hash)
    }

    fn save_audit(&self, audit: &CycleAudit) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.audit_path(audit);
        std::fs::write(&path, serde_json::to_vec_pretty(audit)?)
            .with_context(|| format!("writing audit file {}", path.display()))?;
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct InMemoryTreeStore {
    files: RwLock<HashMap<Hash32, ClaimFile>>,
    audits: RwLock<Vec<CycleAudit>>,
}

impl InMemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audits(&self) -> Vec<CycleAudit> {
        self.audits.read().clone()
    }

    /// Overwrite stored content without rehashing (tamper simulation).
    pub fn tamper(&self, content_hash: Hash32, file: ClaimFile) {
        self.files.write().insert(content_hash, file);
    }
}

impl TreeStore for InMemoryTreeStore {
    fn load(&self, content_hash: &Hash32) -> Result<ClaimFile> {
        self.files
            .read()
            .get(content_hash)
            .cloned()
            .with_context(|| {
                format!("no claim file stored for 0x{}", hex::encode(content_hash))
            })
    }

    fn save(&self, file: &ClaimFile) -> Result<Hash32> {
        let content_hash = content_hash_of(file)?;
        self.files.write().insert(content_hash, file.clone());
        Ok(content_hash)
    }

    fn save_audit(&self, audit: &CycleAudit) -> Result<()> {
        self.audits.write().push(audit.clone());
        Ok(())
    }
}
