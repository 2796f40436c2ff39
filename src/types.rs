// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How the exit code of the generator tool is interpreted.
///
/// - `Signed`: `0` is success, negative codes are warnings and positive codes
///   are critical errors. Both non-zero cases ask the user whether to accept
///   the run anyway.
/// - `ZeroOnly`: `0` is success and anything else is rejected without asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitCodePolicy {
    Signed,
    ZeroOnly,
}

impl Default for ExitCodePolicy {
    fn default() -> Self {
        ExitCodePolicy::Signed
    }
}

impl FromStr for ExitCodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "signed" => Ok(ExitCodePolicy::Signed),
            "zero-only" | "zero_only" => Ok(ExitCodePolicy::ZeroOnly),
            other => Err(format!(
                "invalid exit_code_policy: {other} (expected \"signed\" or \"zero-only\")"
            )),
        }
    }
}

impl ExitCodePolicy {
    /// Classify an exit code reported by the tool.
    pub fn classify(self, exit_code: i32) -> ExitVerdict {
        match (self, exit_code) {
            (_, 0) => ExitVerdict::Accepted,
            (ExitCodePolicy::Signed, code) if code < 0 => {
                ExitVerdict::AskUser(ExitSeverity::Warning)
            }
            (ExitCodePolicy::Signed, _) => ExitVerdict::AskUser(ExitSeverity::CriticalError),
            (ExitCodePolicy::ZeroOnly, _) => ExitVerdict::Rejected,
        }
    }
}

/// Outcome of applying an [`ExitCodePolicy`] to an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitVerdict {
    Accepted,
    AskUser(ExitSeverity),
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSeverity {
    Warning,
    CriticalError,
}

impl fmt::Display for ExitSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitSeverity::Warning => f.write_str("warning"),
            ExitSeverity::CriticalError => f.write_str("critical error"),
        }
    }
}

/// Result of comparing the current fingerprint with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    /// Nothing stored yet for this profile.
    Unknown,
    Fresh,
    Stale,
}

impl CheckState {
    pub fn from_fingerprints(stored: Option<&str>, current: &str) -> Self {
        match stored {
            None => CheckState::Unknown,
            Some(s) if s == current => CheckState::Fresh,
            Some(_) => CheckState::Stale,
        }
    }

    /// `Unknown` and `Stale` both mean the tool should be run again.
    pub fn needs_run(self) -> bool {
        !matches!(self, CheckState::Fresh)
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckState::Unknown => f.write_str("unknown"),
            CheckState::Fresh => f.write_str("fresh"),
            CheckState::Stale => f.write_str("stale"),
        }
    }
}

/// Tri-state answer to the "run the tool first?" question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    /// Run the tool, then continue.
    Yes,
    /// Skip the tool but continue.
    No,
    /// Abort the original launch.
    Cancel,
}

impl PromptAnswer {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptAnswer::Yes => "yes",
            PromptAnswer::No => "no",
            PromptAnswer::Cancel => "cancel",
        }
    }
}

impl FromStr for PromptAnswer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(PromptAnswer::Yes),
            "n" | "no" => Ok(PromptAnswer::No),
            "c" | "cancel" => Ok(PromptAnswer::Cancel),
            other => Err(format!("invalid answer: {other}")),
        }
    }
}
