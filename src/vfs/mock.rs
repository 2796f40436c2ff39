// src/vfs/mock.rs

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};

use super::{join, normalize, VirtualFileRecord, VirtualFileSystem};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File {
        contents: Vec<u8>,
        archive: Option<String>,
        readable: bool,
    },
    Dir(Vec<String>), // child names, in insertion order
}

/// In-memory virtual tree.
///
/// Paths are normalized on the way in, so `meshes/actors/a.txt` and
/// `meshes\actors\a.txt` address the same entry. Lookups are case-sensitive.
/// Children are listed in insertion order, which lets tests control the
/// traversal order.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<String, MockEntry>>>,
    list_calls: Arc<AtomicUsize>,
    real_paths: Arc<Mutex<HashMap<String, PathBuf>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(String::new(), MockEntry::Dir(Vec::new()));

        Self {
            entries: Arc::new(Mutex::new(entries)),
            list_calls: Arc::new(AtomicUsize::new(0)),
            real_paths: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add (or overwrite) a loose file.
    pub fn add_file(&self, path: &str, contents: impl Into<Vec<u8>>) {
        self.insert_file(path, contents.into(), None, true);
    }

    /// Add a file served from inside `archive`.
    pub fn add_archive_file(&self, path: &str, archive: &str, contents: impl Into<Vec<u8>>) {
        self.insert_file(path, contents.into(), Some(archive.to_string()), true);
    }

    /// Add a file that is listed but fails to open.
    pub fn add_unreadable_file(&self, path: &str) {
        self.insert_file(path, Vec::new(), None, false);
    }

    /// Add an empty directory.
    pub fn add_dir(&self, path: &str) {
        let path = normalize(path);
        let mut entries = self.entries();
        Self::ensure_dir_entry(&mut entries, &path);
    }

    /// Pretend `path` is backed by the native file `real`.
    pub fn set_real_path(&self, path: &str, real: impl Into<PathBuf>) {
        self.real_paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(normalize(path), real.into());
    }

    /// Number of `list_files` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn insert_file(&self, path: &str, contents: Vec<u8>, archive: Option<String>, readable: bool) {
        let path = normalize(path);
        let mut entries = self.entries();

        let (parent, name) = split_parent(&path);
        Self::ensure_dir_entry(&mut entries, parent);
        Self::add_child(&mut entries, parent, name);

        entries.insert(
            path,
            MockEntry::File {
                contents,
                archive,
                readable,
            },
        );
    }

    fn ensure_dir_entry(entries: &mut HashMap<String, MockEntry>, path: &str) {
        if entries.contains_key(path) {
            return;
        }
        entries.insert(path.to_string(), MockEntry::Dir(Vec::new()));

        let (parent, name) = split_parent(path);
        Self::ensure_dir_entry(entries, parent);
        Self::add_child(entries, parent, name);
    }

    fn add_child(entries: &mut HashMap<String, MockEntry>, parent: &str, name: &str) {
        if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, MockEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn children(&self, path: &str) -> Result<Vec<(String, MockEntry)>> {
        let path = normalize(path);
        let entries = self.entries();
        match entries.get(&path) {
            Some(MockEntry::Dir(children)) => Ok(children
                .iter()
                .filter_map(|name| {
                    let full = join(&path, name);
                    entries.get(&full).map(|entry| (full, entry.clone()))
                })
                .collect()),
            Some(MockEntry::File { .. }) => Err(anyhow!("not a directory: {path}")),
            None => Ok(Vec::new()),
        }
    }
}

fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('\\') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

impl VirtualFileSystem for MockFileSystem {
    fn list_files(&self, path: &str) -> Result<Vec<VirtualFileRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .children(path)?
            .into_iter()
            .filter_map(|(full, entry)| match entry {
                MockEntry::File { archive, .. } => Some(VirtualFileRecord {
                    path: full,
                    archive,
                }),
                MockEntry::Dir(_) => None,
            })
            .collect())
    }

    fn list_directories(&self, path: &str) -> Result<Vec<String>> {
        Ok(self
            .children(path)?
            .into_iter()
            .filter_map(|(full, entry)| match entry {
                MockEntry::Dir(_) => Some(split_parent(&full).1.to_string()),
                MockEntry::File { .. } => None,
            })
            .collect())
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        let path = normalize(path);
        let entries = self.entries();
        match entries.get(&path) {
            Some(MockEntry::File {
                contents,
                readable: true,
                ..
            }) => Ok(Box::new(Cursor::new(contents.clone()))),
            Some(MockEntry::File { readable: false, .. }) => {
                Err(anyhow!("permission denied: {path}"))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("is a directory: {path}")),
            None => Err(anyhow!("file not found: {path}")),
        }
    }

    fn real_path(&self, path: &str) -> Option<PathBuf> {
        self.real_paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&normalize(path))
            .cloned()
    }
}
