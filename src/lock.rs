//! Persisted lock record
//!
//! `protovend.lock` maps each dependency identity (repo + path + ref) to the
//! content digest and acquisition metadata of its last successful
//! reconciliation. The serialized field order is fixed by struct order below;
//! a run that changes no content must round-trip the file byte-for-byte.
//!
//! Entries are created on first reconciliation and updated in place on later
//! ones. Entries for dependencies that were removed from the configuration
//! are deliberately left alone; pruning is the user's call, not the tool's.

use crate::config::Dep;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the lock file, stored in the work dir.
pub const LOCK_FILE: &str = "protovend.lock";

/// Acquisition metadata for one locked dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LockMetadata {
    /// Dependency kind that produced this entry.
    #[serde(rename = "type")]
    pub kind: String,
    /// Commit the content was acquired at. Preserved from the previous run
    /// when local content was reused without a fetch.
    #[serde(default)]
    pub commit: String,
}

/// One locked dependency: identity fields plus the resolved digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedDep {
    pub metadata: LockMetadata,
    pub repo: String,
    #[serde(default)]
    pub path: String,
    pub r#ref: String,
    pub digest: String,
}

impl LockedDep {
    /// Whether this entry records the same identity as `dep`.
    pub fn is_for(&self, dep: &Dep) -> bool {
        self.repo == dep.repo && self.path == dep.path && self.r#ref == dep.r#ref
    }

    /// Byte-equal comparison of identity and digest, ignoring acquisition
    /// metadata. This is the reuse test: equal means the local content is
    /// exactly what was locked.
    pub fn content_matches(&self, other: &LockedDep) -> bool {
        self.repo == other.repo
            && self.path == other.path
            && self.r#ref == other.r#ref
            && self.digest == other.digest
    }
}

/// The full set of lock entries for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LockFile {
    #[serde(default)]
    pub deps: Vec<LockedDep>,
}

impl LockFile {
    /// Read the lock file at `path`. A missing file is an empty set, not an
    /// error: first runs have nothing locked yet.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no lock file at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Persist the lock set to `path`. Called once, at the end of a fully
    /// successful run; a failed run never reaches this point, so the file on
    /// disk is always consistent with some complete run.
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Look up the entry for a dependency's identity.
    pub fn entry_for(&self, dep: &Dep) -> Option<&LockedDep> {
        self.deps.iter().find(|e| e.is_for(dep))
    }

    /// Replace the entry matching `entry`'s identity in place (preserving
    /// its position), or append it as new.
    pub fn upsert(&mut self, entry: LockedDep) {
        match self.deps.iter_mut().find(|e| {
            e.repo == entry.repo && e.path == entry.path && e.r#ref == entry.r#ref
        }) {
            Some(existing) => *existing = entry,
            None => self.deps.push(entry),
        }
    }
}
