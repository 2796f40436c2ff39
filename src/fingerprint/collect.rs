// src/fingerprint/collect.rs

use tracing::{debug, warn};

use crate::fingerprint::hash::{compute_file_hash, FileFingerprint};
use crate::fingerprint::rules::RuleSet;
use crate::vfs::{join, VirtualFileSystem};

/// Hash every relevant file under `root` into a fresh map.
pub fn collect(
    vfs: &dyn VirtualFileSystem,
    root: &str,
    rules: &RuleSet,
    sensitive: bool,
) -> FileFingerprint {
    let mut fp = FileFingerprint::new();
    collect_into(vfs, root, rules, sensitive, &mut fp);
    fp
}

/// Recursive worker for [`collect`].
///
/// Files that cannot be read and directories that cannot be listed are
/// logged and skipped; the rest of the tree is still scanned.
pub fn collect_into(
    vfs: &dyn VirtualFileSystem,
    path: &str,
    rules: &RuleSet,
    sensitive: bool,
    fp: &mut FileFingerprint,
) {
    match vfs.list_files(path) {
        Ok(files) => {
            for file in files.iter().filter(|f| rules.is_relevant(f, sensitive)) {
                match compute_file_hash(vfs, &file.path) {
                    Ok(hash) => {
                        debug!(file = %file.path, hash = %hash, "hashed relevant file");
                        fp.insert(file.path.clone(), hash);
                    }
                    Err(err) => warn!(file = %file.path, error = %format!("{err:#}"), "failed to open, skipping"),
                }
            }
        }
        Err(err) => warn!(dir = %path, error = %format!("{err:#}"), "failed to list files, skipping"),
    }

    match vfs.list_directories(path) {
        Ok(subdirs) => {
            for name in subdirs {
                collect_into(vfs, &join(path, &name), rules, sensitive, fp);
            }
        }
        Err(err) => warn!(dir = %path, error = %format!("{err:#}"), "failed to list subdirectories, skipping"),
    }
}
