// src/host/mod.rs

//! Collaborators the checker consumes from its host.
//!
//! - [`launcher`] starts the generator tool and waits for its exit code.
//! - [`prompt`] asks the user what to do and reports errors.
//!
//! The virtual file system and the key-value store live in [`crate::vfs`]
//! and [`crate::store`].

pub mod launcher;
pub mod prompt;

pub use launcher::{CommandLauncher, ProcessHandle, ProcessLauncher};
pub use prompt::{
    reply_for_selection, ConsolePrompt, PromptReply, RememberingPrompt, RunToolQuestion,
    UserPrompt, PROMPT_MEMORY_NAMESPACE, RUN_TOOL_CHOICES,
};
