// tests/common/mod.rs

#![allow(dead_code)]

pub use fnischeck_test_utils::builders::{CheckerHarness, ConfigFileBuilder, TOOL_PATH};
pub use fnischeck_test_utils::init_tracing;

use std::io::Cursor;

use fnischeck::fingerprint::compute_content_hash;

pub const LIST_FILE: &str = "meshes\\actors\\x\\FNIS_x_List.txt";
pub const UNRELATED_FILE: &str = "meshes\\actors\\x\\unrelated.txt";
pub const SENSITIVE_FILE: &str = "meshes\\actors\\character\\animations\\mt_idle.hkx";

/// Content digest as the engine computes it.
pub fn content_hash(contents: &[u8]) -> String {
    compute_content_hash(&mut Cursor::new(contents.to_vec())).unwrap()
}
