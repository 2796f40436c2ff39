// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// A missing file is not an error: every section has defaults, so an
/// absent config behaves like an empty one.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = if path.exists() {
        load_from_path(path)?
    } else {
        tracing::debug!(path = ?path, "config file not found, using defaults");
        RawConfigFile::default()
    };
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config path: `FnisCheck.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("FnisCheck.toml")
}
