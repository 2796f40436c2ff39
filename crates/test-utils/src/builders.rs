// crates/test-utils/src/builders.rs

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use fnischeck::check::{CheckerSettings, Collaborators, FnisChecker};
use fnischeck::config::{ConfigFile, RawConfigFile};
use fnischeck::fingerprint::FingerprintEngine;
use fnischeck::store::{KeyValueStore, MemoryStore};
use fnischeck::types::ExitCodePolicy;
use fnischeck::vfs::mock::MockFileSystem;

use crate::fakes::{FakeLauncher, ScriptedPrompt};

/// Virtual path of the generator in trees built by [`CheckerHarness`].
pub const TOOL_PATH: &str = "tools\\GenerateFNIS_for_Users\\GenerateFNISforUsers.exe";

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn enabled(mut self, val: bool) -> Self {
        self.config.check.enabled = val;
        self
    }

    pub fn sensitive(mut self, val: bool) -> Self {
        self.config.check.sensitive = val;
        self
    }

    pub fn scan_root(mut self, root: &str) -> Self {
        self.config.check.scan_root = root.to_string();
        self
    }

    pub fn profile(mut self, profile: &str) -> Self {
        self.config.check.profile = profile.to_string();
        self
    }

    pub fn exit_code_policy(mut self, policy: ExitCodePolicy) -> Self {
        self.config.check.exit_code_policy = policy;
        self
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.config.vfs.sources.push(source.into());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A checker wired to in-memory collaborators, with handles to each of
/// them so tests can script and inspect.
pub struct CheckerHarness {
    pub vfs: MockFileSystem,
    pub store: Arc<MemoryStore>,
    pub launcher: Arc<FakeLauncher>,
    pub prompt: Arc<ScriptedPrompt>,
    pub checker: Arc<FnisChecker>,
}

impl CheckerHarness {
    /// Harness with the generator installed and default settings.
    pub fn new() -> Self {
        Self::with_settings(CheckerSettings::default(), false)
    }

    pub fn with_settings(settings: CheckerSettings, sensitive: bool) -> Self {
        let vfs = MockFileSystem::new();
        vfs.add_file(TOOL_PATH, b"MZ".to_vec());
        Self::with_vfs(vfs, settings, sensitive)
    }

    /// Harness over a caller-built tree (the generator is not added).
    pub fn with_vfs(vfs: MockFileSystem, settings: CheckerSettings, sensitive: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let launcher = FakeLauncher::new();
        let prompt = ScriptedPrompt::new();

        let engine = FingerprintEngine::fnis(sensitive).expect("built-in rules compile");
        let host = Collaborators {
            vfs: Arc::new(vfs.clone()),
            store: store.clone(),
            launcher: launcher.clone(),
            prompt: prompt.clone(),
        };

        Self {
            vfs,
            store,
            launcher,
            prompt,
            checker: Arc::new(FnisChecker::new(engine, settings, host)),
        }
    }
}

impl Default for CheckerHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Checker over `vfs` and an arbitrary store, with fresh fakes for the
/// launcher and the prompt.
pub fn checker_with_store(
    vfs: &MockFileSystem,
    store: Arc<dyn KeyValueStore>,
    settings: CheckerSettings,
) -> (Arc<FnisChecker>, Arc<FakeLauncher>, Arc<ScriptedPrompt>) {
    let launcher = FakeLauncher::new();
    let prompt = ScriptedPrompt::new();
    let host = Collaborators {
        vfs: Arc::new(vfs.clone()),
        store,
        launcher: launcher.clone(),
        prompt: prompt.clone(),
    };
    let engine = FingerprintEngine::fnis(false).expect("built-in rules compile");
    (Arc::new(FnisChecker::new(engine, settings, host)), launcher, prompt)
}
