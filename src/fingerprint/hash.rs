// src/fingerprint/hash.rs

use std::collections::BTreeMap;
use std::io::Read;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::vfs::VirtualFileSystem;

/// Per-file content digests keyed by virtual path.
///
/// `BTreeMap` keeps the keys in byte order, which is the canonical order
/// used by [`reduce`].
pub type FileFingerprint = BTreeMap<String, String>;

/// Delimiter between `<path>=<hash>` entries in the reduced string.
pub const ENTRY_DELIMITER: &str = ",";

/// Hash everything readable from `reader`.
pub fn compute_content_hash(reader: &mut dyn Read) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Open a virtual file and hash its full contents.
pub fn compute_file_hash(vfs: &dyn VirtualFileSystem, path: &str) -> Result<String> {
    let mut reader = vfs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {path}"))?;
    compute_content_hash(&mut reader).with_context(|| format!("reading file for hashing: {path}"))
}

pub fn hash_str(s: &str) -> String {
    blake3::hash(s.as_bytes()).to_hex().to_string()
}

/// Reduce per-file digests into one aggregate fingerprint.
///
/// Entries are rendered as `<path>=<hash>` in path order, joined with
/// [`ENTRY_DELIMITER`], and the joined string is hashed with the same
/// algorithm as the file contents.
pub fn reduce(fp: &FileFingerprint) -> String {
    let flattened: Vec<String> = fp
        .iter()
        .map(|(path, hash)| format!("{path}={hash}"))
        .collect();

    let aggregate = hash_str(&flattened.join(ENTRY_DELIMITER));
    debug!(files = fp.len(), aggregate = %aggregate, "reduced fingerprint");
    aggregate
}
