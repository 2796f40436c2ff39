// src/vfs/mod.rs

//! Virtual file system abstraction.
//!
//! The checker never touches real directories directly. It sees one logical
//! tree with backslash-delimited paths (`meshes\actors\character`), which a
//! host may assemble from several real directories and archives.
//!
//! - [`overlay`] maps an ordered list of real directories onto one tree.
//! - [`mock`] is an in-memory tree used by tests.

use std::fmt::Debug;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;

pub mod mock;
pub mod overlay;

pub use overlay::OverlayFileSystem;

/// Separator used in every virtual path.
pub const SEPARATOR: char = '\\';

/// A file entry as reported by the virtual file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFileRecord {
    /// Full, backslash-normalized virtual path.
    pub path: String,
    /// Name of the archive this file is served from, if any.
    pub archive: Option<String>,
}

impl VirtualFileRecord {
    pub fn loose(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            archive: None,
        }
    }

    pub fn archived(path: impl Into<String>, archive: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            archive: Some(archive.into()),
        }
    }

    pub fn from_archive(&self) -> bool {
        self.archive.as_deref().is_some_and(|a| !a.is_empty())
    }

    pub fn file_name(&self) -> &str {
        file_name(&self.path)
    }
}

/// Abstract virtual file system interface.
pub trait VirtualFileSystem: Send + Sync + Debug {
    /// Files directly inside `path`. Subdirectories are not included.
    fn list_files(&self, path: &str) -> Result<Vec<VirtualFileRecord>>;

    /// Names (not full paths) of the subdirectories directly inside `path`.
    fn list_directories(&self, path: &str) -> Result<Vec<String>>;

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>>;

    /// Real file behind a virtual path, for trees backed by a disk.
    fn real_path(&self, _path: &str) -> Option<PathBuf> {
        None
    }
}

/// Recursively find files under `path` whose record satisfies `predicate`.
///
/// Directories that fail to list are skipped.
pub fn find_files<F>(vfs: &dyn VirtualFileSystem, path: &str, predicate: F) -> Vec<VirtualFileRecord>
where
    F: Fn(&VirtualFileRecord) -> bool,
{
    let mut found = Vec::new();
    let mut stack = vec![normalize(path)];

    while let Some(dir) = stack.pop() {
        match vfs.list_files(&dir) {
            Ok(files) => found.extend(files.into_iter().filter(|f| predicate(f))),
            Err(err) => tracing::debug!(dir = %dir, error = %err, "skipping unlistable directory"),
        }
        if let Ok(subdirs) = vfs.list_directories(&dir) {
            stack.extend(subdirs.iter().map(|name| join(&dir, name)));
        }
    }

    found
}

/// Normalize a virtual path: forward slashes become backslashes, repeated
/// separators collapse, and leading/trailing separators are dropped.
pub fn normalize(path: &str) -> String {
    path.split(is_separator)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\\")
}

/// Join a directory and a child name. An empty `parent` is the tree root.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Last component of a virtual (or native) path.
pub fn file_name(path: &str) -> &str {
    path.rsplit(is_separator).next().unwrap_or(path)
}

/// Whether two native paths name the same file. Paths that cannot be
/// canonicalized (e.g. they do not exist) are compared as given.
pub fn same_real_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == SEPARATOR
}
