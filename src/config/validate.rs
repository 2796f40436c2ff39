// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FnisCheckError, Result};
use crate::vfs::normalize;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::FnisCheckError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_check_section(cfg)?;
    validate_tool_section(cfg)?;
    validate_vfs_section(cfg)?;
    Ok(())
}

fn validate_check_section(cfg: &RawConfigFile) -> Result<()> {
    // exit_code_policy is strongly typed and validated during
    // deserialization, so we don't need to check it here.

    if normalize(&cfg.check.scan_root).is_empty() {
        return Err(FnisCheckError::ConfigError(
            "[check].scan_root must name a directory (got an empty path)".to_string(),
        ));
    }

    if cfg.check.profile.trim().is_empty() {
        return Err(FnisCheckError::ConfigError(
            "[check].profile must not be empty".to_string(),
        ));
    }

    if cfg.check.profile.contains(|c: char| c.is_control()) {
        return Err(FnisCheckError::ConfigError(format!(
            "[check].profile contains control characters: {:?}",
            cfg.check.profile
        )));
    }

    Ok(())
}

fn validate_tool_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.tool.binary_name.trim().is_empty() {
        return Err(FnisCheckError::ConfigError(
            "[tool].binary_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_vfs_section(cfg: &RawConfigFile) -> Result<()> {
    for (idx, source) in cfg.vfs.sources.iter().enumerate() {
        if source.as_os_str().is_empty() {
            return Err(FnisCheckError::ConfigError(format!(
                "[vfs].sources[{idx}] is empty"
            )));
        }
    }
    Ok(())
}
