// src/vfs/overlay.rs

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use super::{join, normalize, VirtualFileRecord, VirtualFileSystem};

/// Presents an ordered list of real directories as one virtual tree.
///
/// Later sources override earlier ones, the same way a mod list overrides
/// the base game data. Names are matched case-insensitively, both when
/// resolving a virtual path inside a source and when merging listings.
#[derive(Debug, Clone)]
pub struct OverlayFileSystem {
    sources: Vec<PathBuf>,
}

impl OverlayFileSystem {
    pub fn new(sources: Vec<PathBuf>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Real directories backing `vpath`, in override order.
    fn real_dirs(&self, vpath: &str) -> Vec<PathBuf> {
        self.sources
            .iter()
            .filter_map(|source| resolve_in(source, vpath))
            .filter(|p| p.is_dir())
            .collect()
    }

    /// Merge the entries of every backing directory, keyed by lowercased
    /// name. A later source replaces the spelling of an earlier one.
    fn merged_entries(&self, vpath: &str, want_dirs: bool) -> Result<BTreeMap<String, String>> {
        let mut merged = BTreeMap::new();

        for dir in self.real_dirs(vpath) {
            let entries =
                fs::read_dir(&dir).with_context(|| format!("reading dir {:?}", dir))?;
            for entry in entries {
                let entry = entry.with_context(|| format!("reading entry in {:?}", dir))?;
                // Follows symlinks, so a linked mod folder lists as a directory.
                let is_dir = match fs::metadata(entry.path()) {
                    Ok(meta) => meta.is_dir(),
                    Err(e) => {
                        debug!(entry = ?entry.path(), error = %e, "skipping dangling entry");
                        continue;
                    }
                };
                if is_dir != want_dirs {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                merged.insert(name.to_lowercase(), name);
            }
        }

        Ok(merged)
    }
}

impl VirtualFileSystem for OverlayFileSystem {
    fn list_files(&self, path: &str) -> Result<Vec<VirtualFileRecord>> {
        let vpath = normalize(path);
        Ok(self
            .merged_entries(&vpath, false)?
            .into_values()
            .map(|name| VirtualFileRecord::loose(join(&vpath, &name)))
            .collect())
    }

    fn list_directories(&self, path: &str) -> Result<Vec<String>> {
        let vpath = normalize(path);
        Ok(self.merged_entries(&vpath, true)?.into_values().collect())
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        let Some(real) = self.real_path(path) else {
            bail!("{} not found in any overlay source", normalize(path));
        };

        debug!(virtual_path = %path, real = ?real, "resolved overlay file");
        let file = fs::File::open(&real).with_context(|| format!("opening file {:?}", real))?;
        Ok(Box::new(file))
    }

    /// Real file behind a virtual path, taken from the last source that
    /// has it.
    fn real_path(&self, path: &str) -> Option<PathBuf> {
        let vpath = normalize(path);
        self.sources
            .iter()
            .rev()
            .filter_map(|source| resolve_in(source, &vpath))
            .find(|real| real.is_file())
    }
}

/// Resolve a virtual path inside one real directory, matching each
/// component case-insensitively when the exact spelling does not exist.
fn resolve_in(source: &Path, vpath: &str) -> Option<PathBuf> {
    let mut current = source.to_path_buf();

    for component in vpath.split('\\').filter(|c| !c.is_empty()) {
        let exact = current.join(component);
        if exact.exists() {
            current = exact;
            continue;
        }

        let wanted = component.to_lowercase();
        let found = fs::read_dir(&current).ok()?.filter_map(|e| e.ok()).find(|e| {
            e.file_name().to_string_lossy().to_lowercase() == wanted
        })?;
        current = found.path();
    }

    Some(current)
}
