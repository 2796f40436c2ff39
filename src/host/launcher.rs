// src/host/launcher.rs

//! Pluggable process launcher.
//!
//! The checker talks to a `ProcessLauncher` instead of spawning processes
//! itself, so tests can swap in a fake that records launches and returns
//! scripted exit codes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::vfs::{OverlayFileSystem, VirtualFileSystem};

/// Opaque handle to a started process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessHandle(pub u64);

pub trait ProcessLauncher: Send + Sync {
    /// Start the program at `path` without waiting for it.
    fn start(&self, path: &str) -> Result<ProcessHandle>;

    /// Block until the process exits and return its exit code.
    fn wait(&self, handle: ProcessHandle) -> Result<i32>;
}

/// Launcher backed by `std::process::Command`.
///
/// With an overlay attached, virtual paths (as returned by the tool
/// locator) are resolved to the real file before spawning.
#[derive(Debug, Default)]
pub struct CommandLauncher {
    overlay: Option<OverlayFileSystem>,
    children: Mutex<HashMap<ProcessHandle, Child>>,
    next_id: AtomicU64,
}

impl CommandLauncher {
    pub fn with_overlay(overlay: OverlayFileSystem) -> Self {
        Self {
            overlay: Some(overlay),
            ..Self::default()
        }
    }

    /// Start `path` with extra command-line arguments.
    pub fn start_with_args(&self, path: &str, args: &[String]) -> Result<ProcessHandle> {
        let program = self
            .overlay
            .as_ref()
            .and_then(|overlay| overlay.real_path(path))
            .unwrap_or_else(|| PathBuf::from(path));

        let child = Command::new(&program)
            .args(args)
            .spawn()
            .with_context(|| format!("spawning {:?}", program))?;

        let handle = ProcessHandle(self.next_id.fetch_add(1, Ordering::SeqCst));
        info!(program = ?program, pid = child.id(), "started process");
        self.children().insert(handle, child);
        Ok(handle)
    }

    fn children(&self) -> MutexGuard<'_, HashMap<ProcessHandle, Child>> {
        self.children.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProcessLauncher for CommandLauncher {
    fn start(&self, path: &str) -> Result<ProcessHandle> {
        self.start_with_args(path, &[])
    }

    fn wait(&self, handle: ProcessHandle) -> Result<i32> {
        let mut child = self
            .children()
            .remove(&handle)
            .ok_or_else(|| anyhow!("unknown process handle {:?}", handle))?;

        let status = child.wait().context("waiting for process")?;
        debug!(?handle, ?status, "process exited");
        status
            .code()
            .ok_or_else(|| anyhow!("process terminated without an exit code ({status})"))
    }
}
