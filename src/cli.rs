// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `fnischeck`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fnischeck",
    version,
    about = "Detect changed FNIS animation sources and offer to regenerate before launching.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `FnisCheck.toml` in the current working directory. A missing
    /// file means all defaults.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path(), global = true)]
    pub config: PathBuf,

    /// Override `[check].profile`.
    #[arg(long, value_name = "NAME", global = true)]
    pub profile: Option<String>,

    /// Force sensitive matching on, regardless of `[check].sensitive`.
    #[arg(long, global = true)]
    pub sensitive: bool,

    /// Never ask: a stale fingerprint cancels the launch and
    /// confirmations take their default. Implied when stdin is not a
    /// terminal.
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FNISCHECK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List relevant files with their hashes and print the aggregate.
    Scan,

    /// Print whether the stored fingerprint is unknown, fresh or stale.
    ///
    /// Exits 0 when fresh and 1 otherwise.
    Status,

    /// Check, then launch an application and wait for it.
    ///
    /// Exits with the application's exit code, or 2 if the launch was
    /// cancelled.
    Run {
        /// Application (virtual or real path) followed by its arguments.
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "APPLICATION"
        )]
        command: Vec<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
