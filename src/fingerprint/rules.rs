// src/fingerprint/rules.rs

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::errors::Result;
use crate::vfs::VirtualFileRecord;

/// Tail patterns for files FNIS always reads.
pub const DEFAULT_PATTERNS: &[&str] = &[
    r"\\FNIS_.*_List\.txt$",
    r"\\FNIS.*Behavior\.txt$",
    r"\\PatchList\.txt$",
    r"\\skeleton.*\.hkx$",
];

/// Tail patterns only considered in sensitive mode: any animation file
/// can influence the generated behaviours, but most of them don't.
pub const SENSITIVE_PATTERNS: &[&str] = &[r"\\animations\\.*\.hkx$"];

/// A single case-insensitive pattern tested against a virtual path.
#[derive(Clone)]
pub struct MatchRule {
    regex: Regex,
}

impl fmt::Debug for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MatchRule").field(&self.regex.as_str()).finish()
    }
}

impl MatchRule {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// The two rule tiers. Built once and never modified.
#[derive(Debug, Clone)]
pub struct RuleSet {
    default: Vec<MatchRule>,
    sensitive: Vec<MatchRule>,
}

impl RuleSet {
    /// Compile the built-in FNIS rule tiers.
    pub fn fnis() -> Result<Self> {
        Self::from_patterns(DEFAULT_PATTERNS, SENSITIVE_PATTERNS)
    }

    pub fn from_patterns<S: AsRef<str>>(default: &[S], sensitive: &[S]) -> Result<Self> {
        Ok(Self {
            default: compile(default)?,
            sensitive: compile(sensitive)?,
        })
    }

    pub fn default_rules(&self) -> &[MatchRule] {
        &self.default
    }

    pub fn sensitive_rules(&self) -> &[MatchRule] {
        &self.sensitive
    }

    /// Whether `file` should take part in the fingerprint.
    ///
    /// Archive-sourced files never do. Otherwise any default rule matches,
    /// or, with `sensitive` set, any sensitive rule.
    pub fn is_relevant(&self, file: &VirtualFileRecord, sensitive: bool) -> bool {
        if file.from_archive() {
            return false;
        }

        if self.default.iter().any(|rule| rule.matches(&file.path)) {
            return true;
        }

        sensitive && self.sensitive.iter().any(|rule| rule.matches(&file.path))
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<MatchRule>> {
    patterns.iter().map(|p| MatchRule::new(p.as_ref())).collect()
}
