// src/check/mod.rs

//! Staleness check around application launches.
//!
//! [`FnisChecker`] implements [`LaunchHooks`], the two points a host calls
//! around every launch:
//!
//! - `before_run`: fingerprint the animation sources, compare with the value
//!   stored for the active profile and, if they differ, offer to run the
//!   generator first. Returns whether the original launch may go ahead.
//! - `after_run`: when the generator itself just finished successfully,
//!   store the current fingerprint.

pub mod guard;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::{debug, error, info, warn};

use crate::check::guard::ActiveGuard;
use crate::fingerprint::FingerprintEngine;
use crate::host::{ProcessLauncher, RunToolQuestion, UserPrompt};
use crate::store::KeyValueStore;
use crate::types::{CheckState, ExitCodePolicy, ExitVerdict, PromptAnswer};
use crate::vfs::{self, VirtualFileSystem};

/// Store namespace for fingerprints; the key is the profile name.
pub const CHECKER_NAME: &str = "FNIS Checker";

/// Prompt identity of the "run the tool first?" question.
pub const RUN_TOOL_PROMPT_ID: &str = "fnisCheck";

/// Hook points a host calls around launching an application.
pub trait LaunchHooks {
    /// `false` aborts the launch.
    fn before_run(&self, application: &str) -> bool;

    fn after_run(&self, application: &str, exit_code: u32);
}

/// Everything the checker needs to know that is not a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerSettings {
    /// When false the tool is treated as not installed.
    pub enabled: bool,
    /// Virtual directory that is fingerprinted.
    pub scan_root: String,
    /// Active profile; fingerprints are stored per profile.
    pub profile: String,
    pub exit_code_policy: ExitCodePolicy,
    /// Virtual directory searched for the tool executable.
    pub tool_search_dir: String,
    /// File name suffix identifying the tool executable.
    pub tool_binary_name: String,
}

impl Default for CheckerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            scan_root: "meshes\\actors".to_string(),
            profile: "Default".to_string(),
            exit_code_policy: ExitCodePolicy::default(),
            tool_search_dir: "tools\\GenerateFNIS_for_Users".to_string(),
            tool_binary_name: "GenerateFNISforUsers.exe".to_string(),
        }
    }
}

/// The host-provided services the checker talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub vfs: Arc<dyn VirtualFileSystem>,
    pub store: Arc<dyn KeyValueStore>,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub prompt: Arc<dyn UserPrompt>,
}

pub struct FnisChecker {
    engine: FingerprintEngine,
    settings: CheckerSettings,
    host: Collaborators,
    active: AtomicBool,
}

impl FnisChecker {
    pub fn new(engine: FingerprintEngine, settings: CheckerSettings, host: Collaborators) -> Self {
        Self {
            engine,
            settings,
            host,
            active: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &CheckerSettings {
        &self.settings
    }

    pub fn engine(&self) -> &FingerprintEngine {
        &self.engine
    }

    /// Virtual path of the generator tool, if it is installed and enabled.
    ///
    /// The virtual file system resolves overrides, so there is at most one
    /// real candidate; the first match wins.
    pub fn locate_tool(&self) -> Option<String> {
        if !self.settings.enabled {
            return None;
        }

        let suffix = self.settings.tool_binary_name.to_lowercase();
        let found = vfs::find_files(
            self.host.vfs.as_ref(),
            &self.settings.tool_search_dir,
            |file| file.path.to_lowercase().ends_with(&suffix),
        );

        match found.into_iter().next() {
            Some(file) => Some(file.path),
            None => {
                debug!(search_dir = %self.settings.tool_search_dir, "generator tool not installed");
                None
            }
        }
    }

    /// Whether `application` is the tool, ignoring case and separator style.
    pub fn is_tool(application: &str, tool: &str) -> bool {
        vfs::normalize(application).to_lowercase() == vfs::normalize(tool).to_lowercase()
    }

    /// Like [`is_tool`](Self::is_tool), but `application` may also be the
    /// native path of the file the virtual tree serves for `tool`.
    pub fn launches_tool(&self, application: &str, tool: &str) -> bool {
        if Self::is_tool(application, tool) {
            return true;
        }
        match self.host.vfs.real_path(tool) {
            Some(real) => vfs::same_real_file(Path::new(application), &real),
            None => false,
        }
    }

    /// Aggregate fingerprint of the scan root as it is right now.
    pub fn current_fingerprint(&self) -> String {
        self.engine
            .fingerprint(self.host.vfs.as_ref(), &self.settings.scan_root)
    }

    /// Fingerprint stored for the active profile. Read errors count as
    /// nothing stored.
    pub fn stored_fingerprint(&self) -> Option<String> {
        match self.host.store.get(CHECKER_NAME, &self.settings.profile) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(profile = %self.settings.profile, error = %format!("{e:#}"), "failed to read stored fingerprint");
                None
            }
        }
    }

    /// Compare the current tree with the stored fingerprint without acting
    /// on the result.
    pub fn status(&self) -> CheckState {
        let current = self.current_fingerprint();
        self.engine
            .compare(self.stored_fingerprint().as_deref(), &current)
    }

    fn persist(&self, fingerprint: &str) {
        match self
            .host
            .store
            .set(CHECKER_NAME, &self.settings.profile, fingerprint)
        {
            Ok(()) => info!(profile = %self.settings.profile, fingerprint = %fingerprint, "stored fingerprint"),
            Err(e) => error!(profile = %self.settings.profile, error = %format!("{e:#}"), "failed to store fingerprint"),
        }
    }

    /// The before-run check. See [`LaunchHooks::before_run`].
    pub fn check_before_run(&self, application: &str) -> bool {
        // A nested call, e.g. for the tool launched below, must not scan again.
        let Some(_guard) = ActiveGuard::acquire(&self.active) else {
            debug!(application = %application, "check already in progress");
            return true;
        };

        let Some(tool) = self.locate_tool() else {
            return true;
        };
        if self.launches_tool(application, &tool) {
            return true;
        }

        let current = self.current_fingerprint();
        let stored = self.stored_fingerprint();
        let state = self.engine.compare(stored.as_deref(), &current);
        info!(application = %application, state = %state, "fingerprint check");

        if !state.needs_run() {
            return true;
        }

        let question = RunToolQuestion {
            identity: RUN_TOOL_PROMPT_ID.to_string(),
            discriminator: vfs::file_name(application).to_string(),
            title: format!("Run FNIS before {application}?"),
            message: "FNIS source data has been changed. You should run GenerateFNIS.exe now."
                .to_string(),
        };

        match self.host.prompt.ask_run_tool(&question).answer {
            PromptAnswer::Yes => self.run_tool(&tool, application, &current),
            PromptAnswer::No => {
                info!(application = %application, "skipping generator, fingerprint left stale");
                true
            }
            PromptAnswer::Cancel => {
                info!(application = %application, "launch cancelled by user");
                false
            }
        }
    }

    /// Run the tool and decide whether the original launch goes ahead.
    /// `fingerprint` is stored when the run is accepted.
    fn run_tool(&self, tool: &str, application: &str, fingerprint: &str) -> bool {
        let handle = match self.host.launcher.start(tool) {
            Ok(handle) => handle,
            Err(e) => {
                error!(tool = %tool, error = %format!("{e:#}"), "failed to start generator");
                self.host
                    .prompt
                    .report_error(&format!("Failed to start {tool}"));
                return true;
            }
        };

        let title = format!("Start {application}?");
        let proceed = match self.host.launcher.wait(handle) {
            Ok(code) => match self.settings.exit_code_policy.classify(code) {
                ExitVerdict::Accepted => true,
                ExitVerdict::AskUser(severity) => {
                    warn!(tool = %tool, exit_code = code, "generator reported a {severity}");
                    self.host.prompt.confirm(
                        &title,
                        &format!(
                            "FNIS reported a {severity}, do you want to run the application anyway?"
                        ),
                        false,
                    )
                }
                ExitVerdict::Rejected => {
                    warn!(tool = %tool, exit_code = code, "generator failed, fingerprint not stored");
                    return true;
                }
            },
            Err(e) => {
                warn!(tool = %tool, error = %format!("{e:#}"), "failed to determine generator exit code");
                self.host.prompt.confirm(
                    &title,
                    "Failed to determine FNIS exit code, do you want to run the application anyway?",
                    false,
                )
            }
        };

        if proceed {
            self.persist(fingerprint);
        }
        proceed
    }

    /// The after-run check. See [`LaunchHooks::after_run`].
    pub fn check_after_run(&self, application: &str, exit_code: u32) {
        let Some(tool) = self.locate_tool() else {
            return;
        };
        if !self.launches_tool(application, &tool) {
            return;
        }

        // Windows exit codes are DWORDs; the tool signals warnings with
        // negative values.
        let code = exit_code as i32;
        let update = match self.settings.exit_code_policy.classify(code) {
            ExitVerdict::Accepted => true,
            ExitVerdict::AskUser(severity) => self.host.prompt.confirm(
                &format!("Start {application}?"),
                &format!("FNIS reported a {severity}. Do you want to assume it worked?"),
                false,
            ),
            ExitVerdict::Rejected => false,
        };

        if update {
            let fingerprint = self.current_fingerprint();
            self.persist(&fingerprint);
        } else {
            debug!(application = %application, exit_code = code, "generator run not accepted");
        }
    }
}

impl LaunchHooks for FnisChecker {
    fn before_run(&self, application: &str) -> bool {
        self.check_before_run(application)
    }

    fn after_run(&self, application: &str, exit_code: u32) {
        self.check_after_run(application, exit_code)
    }
}
