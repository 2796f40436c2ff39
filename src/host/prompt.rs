// src/host/prompt.rs

use std::io::{self, IsTerminal};
use std::sync::Arc;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};

use tracing::{debug, warn};

use crate::store::KeyValueStore;
use crate::types::PromptAnswer;

/// Store namespace holding remembered answers.
pub const PROMPT_MEMORY_NAMESPACE: &str = "prompt-memory";

/// The "run the tool first?" question.
///
/// `identity` names the question itself and `discriminator` tells
/// invocations apart (the launched application's file name), so a
/// remembered answer for one executable does not apply to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunToolQuestion {
    pub identity: String,
    pub discriminator: String,
    pub title: String,
    pub message: String,
}

impl RunToolQuestion {
    fn memory_key(&self) -> String {
        format!("{}/{}", self.identity, self.discriminator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptReply {
    pub answer: PromptAnswer,
    /// The user asked for this answer to be reused next time.
    pub remember: bool,
}

impl PromptReply {
    pub const fn once(answer: PromptAnswer) -> Self {
        Self {
            answer,
            remember: false,
        }
    }

    pub const fn remembered(answer: PromptAnswer) -> Self {
        Self {
            answer,
            remember: true,
        }
    }
}

pub trait UserPrompt: Send + Sync {
    fn ask_run_tool(&self, question: &RunToolQuestion) -> PromptReply;

    /// Yes/no question; `default` is used when the user gives no answer.
    fn confirm(&self, title: &str, message: &str, default: bool) -> bool;

    fn report_error(&self, message: &str);
}

/// Adds "remember my answer" on top of any prompt.
///
/// Remembered answers live in the key-value store under
/// [`PROMPT_MEMORY_NAMESPACE`], keyed by `<identity>/<discriminator>`.
pub struct RememberingPrompt {
    inner: Arc<dyn UserPrompt>,
    store: Arc<dyn KeyValueStore>,
}

impl RememberingPrompt {
    pub fn new(inner: Arc<dyn UserPrompt>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { inner, store }
    }

    fn recall(&self, key: &str) -> Option<PromptAnswer> {
        match self.store.get(PROMPT_MEMORY_NAMESPACE, key) {
            Ok(Some(raw)) => match raw.parse() {
                Ok(answer) => Some(answer),
                Err(e) => {
                    warn!(key = %key, error = %e, "ignoring unreadable remembered answer");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %format!("{e:#}"), "failed to read remembered answer");
                None
            }
        }
    }
}

impl UserPrompt for RememberingPrompt {
    fn ask_run_tool(&self, question: &RunToolQuestion) -> PromptReply {
        let key = question.memory_key();

        if let Some(answer) = self.recall(&key) {
            debug!(key = %key, answer = answer.as_str(), "using remembered answer");
            return PromptReply::once(answer);
        }

        let reply = self.inner.ask_run_tool(question);
        if reply.remember {
            if let Err(e) = self
                .store
                .set(PROMPT_MEMORY_NAMESPACE, &key, reply.answer.as_str())
            {
                warn!(key = %key, error = %format!("{e:#}"), "failed to remember answer");
            }
        }
        reply
    }

    fn confirm(&self, title: &str, message: &str, default: bool) -> bool {
        self.inner.confirm(title, message, default)
    }

    fn report_error(&self, message: &str) {
        self.inner.report_error(message)
    }
}

/// Choices offered for the run-tool question, in menu order.
pub const RUN_TOOL_CHOICES: [(&str, PromptReply); 5] = [
    ("Yes", PromptReply::once(PromptAnswer::Yes)),
    ("Yes, and remember for this application", PromptReply::remembered(PromptAnswer::Yes)),
    ("No", PromptReply::once(PromptAnswer::No)),
    ("No, and remember for this application", PromptReply::remembered(PromptAnswer::No)),
    ("Cancel", PromptReply::once(PromptAnswer::Cancel)),
];

/// Map a menu selection to a reply. No selection (Esc, `q`) cancels.
pub fn reply_for_selection(selection: Option<usize>) -> PromptReply {
    selection
        .and_then(|idx| RUN_TOOL_CHOICES.get(idx))
        .map(|(_, reply)| *reply)
        .unwrap_or(PromptReply::once(PromptAnswer::Cancel))
}

/// Terminal prompt built on `dialoguer`.
///
/// Without a terminal on stdin (or when built with
/// [`ConsolePrompt::non_interactive`]) nothing is asked: the run-tool
/// question cancels and confirmations take their default.
#[derive(Debug, Clone)]
pub struct ConsolePrompt {
    non_interactive: bool,
}

impl ConsolePrompt {
    pub fn new(non_interactive: bool) -> Self {
        Self {
            non_interactive: non_interactive || !io::stdin().is_terminal(),
        }
    }

    pub fn non_interactive() -> Self {
        Self {
            non_interactive: true,
        }
    }

    pub fn is_interactive(&self) -> bool {
        !self.non_interactive
    }
}

impl UserPrompt for ConsolePrompt {
    fn ask_run_tool(&self, question: &RunToolQuestion) -> PromptReply {
        if self.non_interactive {
            debug!(title = %question.title, "no terminal, cancelling");
            return reply_for_selection(None);
        }

        eprintln!("{}", question.message);
        let labels: Vec<&str> = RUN_TOOL_CHOICES.iter().map(|(label, _)| *label).collect();
        let theme = ColorfulTheme::default();
        let selection = Select::with_theme(&theme)
            .with_prompt(question.title.as_str())
            .items(&labels)
            .default(0)
            .interact_opt();

        match selection {
            Ok(selection) => reply_for_selection(selection),
            Err(e) => {
                warn!(error = %e, "failed to read answer, cancelling");
                reply_for_selection(None)
            }
        }
    }

    fn confirm(&self, title: &str, message: &str, default: bool) -> bool {
        if self.non_interactive {
            debug!(title = %title, default, "no terminal, using default");
            return default;
        }

        let theme = ColorfulTheme::default();
        let answer = Confirm::with_theme(&theme)
            .with_prompt(format!("{title} {message}"))
            .default(default)
            .interact_opt();

        match answer {
            Ok(Some(answer)) => answer,
            Ok(None) => default,
            Err(e) => {
                warn!(error = %e, "failed to read answer, using default");
                default
            }
        }
    }

    fn report_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}
