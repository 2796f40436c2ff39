// src/fingerprint/mod.rs

//! Change detection over the virtual file tree.
//!
//! - [`rules`] decides which files matter (default and sensitive tiers).
//! - [`collect`] walks the tree and hashes each relevant file.
//! - [`hash`] owns the content hash and the reduction into one aggregate.
//!
//! [`FingerprintEngine`] bundles the three. It has no state beyond its
//! immutable rules and never writes anything.

pub mod collect;
pub mod hash;
pub mod rules;

pub use collect::collect;
pub use hash::{compute_content_hash, reduce, FileFingerprint};
pub use rules::{MatchRule, RuleSet};

use tracing::info;

use crate::errors::Result;
use crate::types::CheckState;
use crate::vfs::{normalize, VirtualFileSystem};

#[derive(Debug, Clone)]
pub struct FingerprintEngine {
    rules: RuleSet,
    sensitive: bool,
}

impl FingerprintEngine {
    pub fn new(rules: RuleSet, sensitive: bool) -> Self {
        Self { rules, sensitive }
    }

    /// Engine with the built-in FNIS rules.
    pub fn fnis(sensitive: bool) -> Result<Self> {
        Ok(Self::new(RuleSet::fnis()?, sensitive))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn sensitive(&self) -> bool {
        self.sensitive
    }

    /// Per-file digests of every relevant file under `root`.
    pub fn collect(&self, vfs: &dyn VirtualFileSystem, root: &str) -> FileFingerprint {
        collect(vfs, &normalize(root), &self.rules, self.sensitive)
    }

    /// Aggregate fingerprint of `root`.
    pub fn fingerprint(&self, vfs: &dyn VirtualFileSystem, root: &str) -> String {
        let files = self.collect(vfs, root);
        let aggregate = reduce(&files);
        info!(root = %root, files = files.len(), fingerprint = %aggregate, "computed fingerprint");
        aggregate
    }

    /// Compare a freshly computed fingerprint with the stored one.
    pub fn compare(&self, stored: Option<&str>, current: &str) -> CheckState {
        CheckState::from_fingerprints(stored, current)
    }
}
