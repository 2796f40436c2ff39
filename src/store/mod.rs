// src/store/mod.rs

//! Persistent key-value storage for fingerprints and remembered answers.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

/// Default location of the fingerprint file, relative to the working dir.
pub const STORE_FILE_PATH: &str = ".fnischeck/fingerprints";

type Entries = BTreeMap<(String, String), String>;

/// Abstract string storage keyed by `(namespace, key)`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>>;
    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()>;
}

/// Stores values in memory only (lost on restart).
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, Entries> {
        self.map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .map()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        self.map()
            .insert((namespace.to_string(), key.to_string()), value.to_string());
        debug!(namespace = %namespace, key = %key, "stored value (memory)");
        Ok(())
    }
}

/// Stores values in a text file, one `namespace<TAB>key<TAB>value` per line.
///
/// The whole file is read on every access and rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let map = load_all(&self.path)?;
        Ok(map.get(&(namespace.to_string(), key.to_string())).cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        for field in [namespace, key, value] {
            if field.contains(|c: char| matches!(c, '\t' | '\n' | '\r')) {
                bail!("store fields cannot contain tabs or newlines: {field:?}");
            }
        }

        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut map = load_all(&self.path)?;
        map.insert((namespace.to_string(), key.to_string()), value.to_string());
        save_all(&self.path, &map)?;
        info!(namespace = %namespace, key = %key, path = ?self.path, "stored value (file)");
        Ok(())
    }
}

fn load_all(path: &Path) -> Result<Entries> {
    if !path.exists() {
        return Ok(Entries::new());
    }

    let file = File::open(path).with_context(|| format!("opening store file at {:?}", path))?;
    let reader = BufReader::new(file);

    let mut map = Entries::new();

    for line_res in reader.lines() {
        let line = line_res?;
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.splitn(3, '\t');
        if let (Some(ns), Some(key), Some(value)) = (parts.next(), parts.next(), parts.next()) {
            map.insert((ns.to_string(), key.to_string()), value.to_string());
        }
    }

    Ok(map)
}

fn save_all(path: &Path, map: &Entries) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating store directory at {:?}", parent))?;
        }
    }

    let file = File::create(path).with_context(|| format!("creating store file at {:?}", path))?;
    let mut writer = BufWriter::new(file);

    for ((ns, key), value) in map.iter() {
        writeln!(writer, "{ns}\t{key}\t{value}")?;
    }

    writer.flush()?;
    Ok(())
}
