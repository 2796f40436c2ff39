// src/lib.rs

pub mod check;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fingerprint;
pub mod host;
pub mod logging;
pub mod store;
pub mod types;
pub mod vfs;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::check::{Collaborators, FnisChecker, LaunchHooks};
use crate::cli::{CliArgs, Command};
use crate::config::load_and_validate;
use crate::config::model::ConfigFile;
use crate::fingerprint::FingerprintEngine;
use crate::host::{CommandLauncher, ConsolePrompt, ProcessLauncher, RememberingPrompt};
use crate::store::{FileStore, KeyValueStore};
use crate::types::CheckState;
use crate::vfs::OverlayFileSystem;

/// Exit code of `run` when the user cancels the launch.
pub const EXIT_CANCELLED: i32 = 2;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (plus CLI overrides)
/// - the overlay file system and the fingerprint store
/// - the checker with a console prompt and a real launcher
///
/// Returns the process exit code.
pub fn run(args: CliArgs) -> Result<i32> {
    let config_path = args.config.clone();
    let mut cfg = load_and_validate(&config_path)?;

    if let Some(profile) = &args.profile {
        cfg.check.profile = profile.clone();
    }
    if args.sensitive {
        cfg.check.sensitive = true;
    }

    let root_dir = config_root_dir(&config_path);
    let non_interactive = args.non_interactive;
    let overlay = build_overlay(&cfg, &root_dir);
    let engine = FingerprintEngine::fnis(cfg.check.sensitive)?;

    match args.command {
        Command::Scan => {
            print_scan(&engine, &overlay, &cfg.check.scan_root);
            Ok(0)
        }
        Command::Status => {
            let (checker, _) = build_checker(&cfg, &root_dir, overlay, engine, non_interactive);
            let state = checker.status();
            println!("{state}");
            Ok(if state == CheckState::Fresh { 0 } else { 1 })
        }
        Command::Run { command } => {
            let (checker, launcher) =
                build_checker(&cfg, &root_dir, overlay, engine, non_interactive);
            let (application, app_args) = match command.split_first() {
                Some((app, rest)) => (app.clone(), rest.to_vec()),
                None => anyhow::bail!("no application given"),
            };

            if !checker.before_run(&application) {
                info!(application = %application, "launch aborted");
                return Ok(EXIT_CANCELLED);
            }

            let handle = launcher.start_with_args(&application, &app_args)?;
            let code = launcher.wait(handle)?;
            checker.after_run(&application, code as u32);
            Ok(code)
        }
    }
}

/// Figure out the directory relative config paths are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "game/FnisCheck.toml"),
///   we use that directory.
/// - If it's just a bare filename like "FnisCheck.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn resolve(root_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root_dir.join(path)
    }
}

fn build_overlay(cfg: &ConfigFile, root_dir: &Path) -> OverlayFileSystem {
    let sources: Vec<PathBuf> = if cfg.vfs.sources.is_empty() {
        vec![root_dir.to_path_buf()]
    } else {
        cfg.vfs
            .sources
            .iter()
            .map(|s| resolve(root_dir, s))
            .collect()
    };
    debug!(?sources, "overlay sources");
    OverlayFileSystem::new(sources)
}

fn build_checker(
    cfg: &ConfigFile,
    root_dir: &Path,
    overlay: OverlayFileSystem,
    engine: FingerprintEngine,
    non_interactive: bool,
) -> (FnisChecker, Arc<CommandLauncher>) {
    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileStore::new(resolve(root_dir, &cfg.store.path)));
    let launcher = Arc::new(CommandLauncher::with_overlay(overlay.clone()));
    let console = ConsolePrompt::new(non_interactive);
    let prompt = RememberingPrompt::new(Arc::new(console), store.clone());

    let host = Collaborators {
        vfs: Arc::new(overlay),
        store,
        launcher: launcher.clone() as Arc<dyn ProcessLauncher>,
        prompt: Arc::new(prompt),
    };

    (FnisChecker::new(engine, cfg.checker_settings(), host), launcher)
}

/// `scan` output: one `<hash>  <path>` line per relevant file, then the
/// aggregate.
fn print_scan(engine: &FingerprintEngine, overlay: &OverlayFileSystem, scan_root: &str) {
    let files = engine.collect(overlay, scan_root);
    for (path, hash) in files.iter() {
        println!("{hash}  {path}");
    }
    println!();
    println!("files: {}", files.len());
    println!("fingerprint: {}", fingerprint::reduce(&files));
}
