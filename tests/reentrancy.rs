// tests/reentrancy.rs

mod common;
use crate::common::{init_tracing, CheckerHarness, LIST_FILE, TOOL_PATH};

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use fnischeck::check::guard::ActiveGuard;
use fnischeck::check::LaunchHooks;
use fnischeck::types::PromptAnswer;

#[test]
fn guard_is_exclusive_and_released_on_drop() {
    let flag = AtomicBool::new(false);

    let first = ActiveGuard::acquire(&flag);
    assert!(first.is_some());
    assert!(ActiveGuard::acquire(&flag).is_none());

    drop(first);
    assert!(ActiveGuard::acquire(&flag).is_some());
}

#[test]
fn nested_check_proceeds_immediately_without_scanning() {
    init_tracing();
    let h = CheckerHarness::new();
    h.vfs.add_file(LIST_FILE, "v1");

    let nested: Arc<Mutex<Vec<(bool, usize)>>> = Arc::default();
    {
        let weak = Arc::downgrade(&h.checker);
        let vfs = h.vfs.clone();
        let nested = nested.clone();
        h.prompt.set_on_ask(move |_| {
            let checker = weak.upgrade().expect("checker alive");
            let calls_before = vfs.list_calls();
            let proceed = checker.before_run("Nested.exe");
            nested
                .lock()
                .unwrap()
                .push((proceed, vfs.list_calls() - calls_before));
        });
    }

    assert!(h.checker.before_run("SkyrimSE.exe"));

    assert_eq!(*nested.lock().unwrap(), vec![(true, 0)]);
    assert_eq!(h.prompt.questions().len(), 1);
}

#[test]
fn tool_launch_intercepted_by_host_is_not_checked_again() {
    init_tracing();
    let h = CheckerHarness::new();
    h.vfs.add_file(LIST_FILE, "v1");

    let nested: Arc<Mutex<Vec<bool>>> = Arc::default();
    {
        let weak = Arc::downgrade(&h.checker);
        let nested = nested.clone();
        h.launcher.set_on_start(move |path| {
            let checker = weak.upgrade().expect("checker alive");
            nested.lock().unwrap().push(checker.before_run(path));
        });
    }

    assert!(h.checker.before_run("SkyrimSE.exe"));

    assert_eq!(*nested.lock().unwrap(), vec![true]);
    assert_eq!(h.launcher.started(), vec![TOOL_PATH.to_string()]);
    assert_eq!(h.prompt.questions().len(), 1);
}

#[test]
fn guard_is_released_after_every_outcome() {
    init_tracing();
    let h = CheckerHarness::new();
    h.vfs.add_file(LIST_FILE, "v1");

    // Cancel returns early; the next call must still run a full check.
    h.prompt.push_answer(PromptAnswer::Cancel);
    assert!(!h.checker.before_run("SkyrimSE.exe"));

    // Launch failure path.
    h.launcher.fail_next_start();
    assert!(h.checker.before_run("SkyrimSE.exe"));

    // Skip path.
    h.prompt.push_answer(PromptAnswer::No);
    assert!(h.checker.before_run("SkyrimSE.exe"));

    // Tool's own launch path.
    assert!(h.checker.before_run(TOOL_PATH));

    // Successful run.
    assert!(h.checker.before_run("SkyrimSE.exe"));

    assert_eq!(h.prompt.questions().len(), 4);

    // Fresh now: checked again, silently.
    let calls_before = h.vfs.list_calls();
    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert!(h.vfs.list_calls() > calls_before);
    assert_eq!(h.prompt.questions().len(), 4);
}
