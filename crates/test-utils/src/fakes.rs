// crates/test-utils/src/fakes.rs

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use fnischeck::host::{ProcessHandle, ProcessLauncher, PromptReply, RunToolQuestion, UserPrompt};
use fnischeck::store::{KeyValueStore, MemoryStore};
use fnischeck::types::PromptAnswer;

type Hook = Box<dyn Fn(&str) + Send + Sync>;

/// A fake launcher that:
/// - records which programs were started
/// - returns scripted exit codes (default `0`)
/// - optionally runs a hook on start, e.g. to let the "tool" touch files.
#[derive(Default)]
pub struct FakeLauncher {
    started: Mutex<Vec<String>>,
    fail_start: Mutex<bool>,
    exit_codes: Mutex<VecDeque<Result<i32, String>>>,
    on_start: Mutex<Option<Hook>>,
}

impl FakeLauncher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn fail_next_start(&self) {
        *self.fail_start.lock().unwrap() = true;
    }

    pub fn push_exit_code(&self, code: i32) {
        self.exit_codes.lock().unwrap().push_back(Ok(code));
    }

    pub fn push_wait_failure(&self, message: &str) {
        self.exit_codes
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn set_on_start(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.on_start.lock().unwrap() = Some(Box::new(hook));
    }
}

impl ProcessLauncher for FakeLauncher {
    fn start(&self, path: &str) -> Result<ProcessHandle> {
        if std::mem::take(&mut *self.fail_start.lock().unwrap()) {
            return Err(anyhow!("cannot start {path}"));
        }

        let id = {
            let mut started = self.started.lock().unwrap();
            started.push(path.to_string());
            started.len() as u64
        };

        if let Some(hook) = self.on_start.lock().unwrap().as_ref() {
            hook(path);
        }

        Ok(ProcessHandle(id))
    }

    fn wait(&self, _handle: ProcessHandle) -> Result<i32> {
        match self.exit_codes.lock().unwrap().pop_front() {
            Some(Ok(code)) => Ok(code),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(0),
        }
    }
}

type AskHook = Box<dyn Fn(&RunToolQuestion) + Send + Sync>;

/// A fake prompt with scripted answers that records every interaction.
///
/// Unscripted run-tool questions answer `Yes`; unscripted confirmations
/// return the default offered by the caller.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<PromptReply>>,
    confirmations: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<RunToolQuestion>>,
    confirms_asked: Mutex<Vec<(String, String)>>,
    errors: Mutex<Vec<String>>,
    on_ask: Mutex<Option<AskHook>>,
}

impl ScriptedPrompt {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_answer(&self, answer: PromptAnswer) {
        self.answers.lock().unwrap().push_back(PromptReply::once(answer));
    }

    pub fn push_remembered_answer(&self, answer: PromptAnswer) {
        self.answers
            .lock()
            .unwrap()
            .push_back(PromptReply::remembered(answer));
    }

    pub fn push_confirmation(&self, answer: bool) {
        self.confirmations.lock().unwrap().push_back(answer);
    }

    pub fn set_on_ask(&self, hook: impl Fn(&RunToolQuestion) + Send + Sync + 'static) {
        *self.on_ask.lock().unwrap() = Some(Box::new(hook));
    }

    /// Run-tool questions asked so far.
    pub fn questions(&self) -> Vec<RunToolQuestion> {
        self.questions.lock().unwrap().clone()
    }

    /// `(title, message)` of every confirmation asked so far.
    pub fn confirmations_asked(&self) -> Vec<(String, String)> {
        self.confirms_asked.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl UserPrompt for ScriptedPrompt {
    fn ask_run_tool(&self, question: &RunToolQuestion) -> PromptReply {
        self.questions.lock().unwrap().push(question.clone());

        if let Some(hook) = self.on_ask.lock().unwrap().as_ref() {
            hook(question);
        }

        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PromptReply::once(PromptAnswer::Yes))
    }

    fn confirm(&self, title: &str, message: &str, default: bool) -> bool {
        self.confirms_asked
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        self.confirmations.lock().unwrap().pop_front().unwrap_or(default)
    }

    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// A store whose reads or writes can be switched to fail. Calls that are
/// allowed through go to an in-memory store.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    write_attempts: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `set` calls, failed or not.
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("store unavailable: cannot read {namespace}/{key}");
        }
        self.inner.get(namespace, key)
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("store unavailable: cannot write {namespace}/{key}");
        }
        self.inner.set(namespace, key, value)
    }
}
