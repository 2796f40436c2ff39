// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::check::CheckerSettings;
use crate::store::STORE_FILE_PATH;
use crate::types::ExitCodePolicy;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [check]
/// enabled = true
/// sensitive = false
/// scan_root = "meshes\\actors"
/// profile = "Default"
/// exit_code_policy = "signed"
///
/// [tool]
/// search_dir = "tools\\GenerateFNIS_for_Users"
/// binary_name = "GenerateFNISforUsers.exe"
///
/// [vfs]
/// sources = ["Data", "mods/FNIS"]
///
/// [store]
/// path = ".fnischeck/fingerprints"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub check: CheckSection,

    #[serde(default)]
    pub tool: ToolSection,

    #[serde(default)]
    pub vfs: VfsSection,

    #[serde(default)]
    pub store: StoreSection,
}

/// Validated configuration. Only constructed through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub check: CheckSection,
    pub tool: ToolSection,
    pub vfs: VfsSection,
    pub store: StoreSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            check: raw.check,
            tool: raw.tool,
            vfs: raw.vfs,
            store: raw.store,
        }
    }

    /// Settings for [`crate::check::FnisChecker`].
    pub fn checker_settings(&self) -> CheckerSettings {
        CheckerSettings {
            enabled: self.check.enabled,
            scan_root: self.check.scan_root.clone(),
            profile: self.check.profile.clone(),
            exit_code_policy: self.check.exit_code_policy,
            tool_search_dir: self.tool.search_dir.clone(),
            tool_binary_name: self.tool.binary_name.clone(),
        }
    }
}

/// `[check]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSection {
    /// Master switch. When false every launch proceeds unchecked.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Also fingerprint every `animations\*.hkx`. More reliable, but asks
    /// to regenerate more often than necessary.
    #[serde(default)]
    pub sensitive: bool,

    #[serde(default = "default_scan_root")]
    pub scan_root: String,

    #[serde(default = "default_profile")]
    pub profile: String,

    /// `"signed"` (default) or `"zero-only"`.
    #[serde(default)]
    pub exit_code_policy: ExitCodePolicy,
}

fn default_true() -> bool {
    true
}

fn default_scan_root() -> String {
    CheckerSettings::default().scan_root
}

fn default_profile() -> String {
    CheckerSettings::default().profile
}

impl Default for CheckSection {
    fn default() -> Self {
        Self {
            enabled: true,
            sensitive: false,
            scan_root: default_scan_root(),
            profile: default_profile(),
            exit_code_policy: ExitCodePolicy::default(),
        }
    }
}

/// `[tool]` section: where the generator lives in the virtual tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolSection {
    #[serde(default = "default_search_dir")]
    pub search_dir: String,

    #[serde(default = "default_binary_name")]
    pub binary_name: String,
}

fn default_search_dir() -> String {
    CheckerSettings::default().tool_search_dir
}

fn default_binary_name() -> String {
    CheckerSettings::default().tool_binary_name
}

impl Default for ToolSection {
    fn default() -> Self {
        Self {
            search_dir: default_search_dir(),
            binary_name: default_binary_name(),
        }
    }
}

/// `[vfs]` section.
///
/// `sources` are real directories layered into one virtual tree, later
/// entries overriding earlier ones. Relative paths are resolved against the
/// directory holding the config file; an empty list means that directory
/// alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VfsSection {
    #[serde(default)]
    pub sources: Vec<PathBuf>,
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(STORE_FILE_PATH)
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}
