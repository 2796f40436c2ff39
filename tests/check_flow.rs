// tests/check_flow.rs

mod common;
use crate::common::{
    content_hash, init_tracing, CheckerHarness, LIST_FILE, TOOL_PATH, UNRELATED_FILE,
};

use std::collections::BTreeMap;
use std::error::Error;

use fnischeck::check::{CheckerSettings, FnisChecker, LaunchHooks, CHECKER_NAME, RUN_TOOL_PROMPT_ID};
use fnischeck::fingerprint::reduce;
use fnischeck::store::KeyValueStore;
use fnischeck::types::{CheckState, PromptAnswer};
use fnischeck::vfs::mock::MockFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

fn stored(h: &CheckerHarness) -> Option<String> {
    h.store.get(CHECKER_NAME, "Default").unwrap()
}

fn scenario() -> CheckerHarness {
    let h = CheckerHarness::new();
    h.vfs.add_file(LIST_FILE, "list v1");
    h.vfs.add_file(UNRELATED_FILE, "noise");
    h
}

/// Unknown -> run tool -> Fresh -> content change -> Stale again.
#[test]
fn prompts_until_tool_has_run_then_stays_quiet_until_sources_change() -> TestResult {
    init_tracing();
    let h = scenario();

    assert_eq!(h.checker.status(), CheckState::Unknown);

    // First launch: nothing stored, user accepts, tool exits 0.
    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert_eq!(h.prompt.questions().len(), 1);
    assert_eq!(h.launcher.started(), vec![TOOL_PATH.to_string()]);

    let f1 = reduce(&BTreeMap::from([(LIST_FILE.to_string(), content_hash(b"list v1"))]));
    assert_eq!(stored(&h), Some(f1.clone()));
    assert_eq!(h.checker.status(), CheckState::Fresh);

    // Second launch: nothing changed, no prompt.
    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert_eq!(h.prompt.questions().len(), 1);
    assert_eq!(h.launcher.started().len(), 1);

    // Unrelated edits don't matter.
    h.vfs.add_file(UNRELATED_FILE, "more noise");
    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert_eq!(h.prompt.questions().len(), 1);

    // Third launch after the list changed: stale, prompt again.
    h.vfs.add_file(LIST_FILE, "list v2");
    assert_eq!(h.checker.status(), CheckState::Stale);
    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert_eq!(h.prompt.questions().len(), 2);

    let f2 = stored(&h).unwrap();
    assert_ne!(f1, f2);
    Ok(())
}

#[test]
fn question_names_the_application_and_uses_its_file_name_as_discriminator() {
    init_tracing();
    let h = scenario();

    h.checker.before_run("C:/Games/Skyrim/SkyrimSE.exe");

    let q = &h.prompt.questions()[0];
    assert_eq!(q.identity, RUN_TOOL_PROMPT_ID);
    assert_eq!(q.discriminator, "SkyrimSE.exe");
    assert!(q.title.contains("C:/Games/Skyrim/SkyrimSE.exe"));
}

#[test]
fn answering_no_proceeds_but_leaves_the_fingerprint_stale() {
    init_tracing();
    let h = scenario();
    h.prompt.push_answer(PromptAnswer::No);

    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert!(h.launcher.started().is_empty());
    assert_eq!(stored(&h), None);

    // Still stale, so the next launch asks again.
    h.prompt.push_answer(PromptAnswer::No);
    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert_eq!(h.prompt.questions().len(), 2);
}

#[test]
fn cancelling_aborts_the_launch_without_side_effects() {
    init_tracing();
    let h = scenario();
    h.prompt.push_answer(PromptAnswer::Cancel);

    assert!(!h.checker.before_run("SkyrimSE.exe"));
    assert!(h.launcher.started().is_empty());
    assert_eq!(stored(&h), None);
}

#[test]
fn stale_fingerprint_from_an_older_tree_prompts() {
    init_tracing();
    let h = scenario();
    h.store.set(CHECKER_NAME, "Default", "0000").unwrap();
    h.prompt.push_answer(PromptAnswer::No);

    assert_eq!(h.checker.status(), CheckState::Stale);
    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert_eq!(h.prompt.questions().len(), 1);
    assert_eq!(stored(&h).as_deref(), Some("0000"));
}

#[test]
fn fingerprints_are_kept_per_profile() {
    init_tracing();
    let vfs = MockFileSystem::new();
    vfs.add_file(TOOL_PATH, "MZ");
    vfs.add_file(LIST_FILE, "v1");

    let a = CheckerHarness::with_vfs(vfs.clone(), CheckerSettings::default(), false);
    assert!(a.checker.before_run("SkyrimSE.exe"));
    assert!(a.store.get(CHECKER_NAME, "Default").unwrap().is_some());

    let settings = CheckerSettings {
        profile: "Survival".to_string(),
        ..CheckerSettings::default()
    };
    let b = CheckerHarness::with_vfs(vfs, settings, false);
    b.store
        .set(CHECKER_NAME, "Default", &a.checker.current_fingerprint())
        .unwrap();

    assert_eq!(b.checker.status(), CheckState::Unknown);
}

#[test]
fn missing_tool_means_no_check() {
    init_tracing();
    let vfs = MockFileSystem::new();
    vfs.add_file(LIST_FILE, "v1");
    let h = CheckerHarness::with_vfs(vfs, CheckerSettings::default(), false);

    assert_eq!(h.checker.locate_tool(), None);
    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert!(h.prompt.questions().is_empty());
}

#[test]
fn disabled_checker_never_prompts() {
    init_tracing();
    let settings = CheckerSettings {
        enabled: false,
        ..CheckerSettings::default()
    };
    let h = CheckerHarness::with_settings(settings, false);
    h.vfs.add_file(LIST_FILE, "v1");

    assert_eq!(h.checker.locate_tool(), None);
    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert!(h.prompt.questions().is_empty());
}

#[test]
fn tool_is_found_anywhere_under_the_search_dir_ignoring_case() {
    init_tracing();
    let vfs = MockFileSystem::new();
    let nested = "tools\\GenerateFNIS_for_Users\\bin\\generatefnisforusers.EXE";
    vfs.add_file(nested, "MZ");
    let h = CheckerHarness::with_vfs(vfs, CheckerSettings::default(), false);

    assert_eq!(h.checker.locate_tool().as_deref(), Some(nested));
}

#[test]
fn launching_the_tool_itself_is_never_checked() {
    init_tracing();
    let h = scenario();

    assert!(h.checker.before_run("TOOLS/generatefnis_for_users/GenerateFNISforUsers.exe"));
    assert!(h.prompt.questions().is_empty());
    assert!(FnisChecker::is_tool(
        "tools/GenerateFNIS_for_Users/GenerateFNISforUsers.exe",
        TOOL_PATH
    ));
    assert!(!FnisChecker::is_tool("SkyrimSE.exe", TOOL_PATH));
}

#[test]
fn failing_to_start_the_tool_reports_and_still_proceeds() {
    init_tracing();
    let h = scenario();
    h.launcher.fail_next_start();

    assert!(h.checker.before_run("SkyrimSE.exe"));
    let errors = h.prompt.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(TOOL_PATH));
    assert_eq!(stored(&h), None);
}

#[test]
fn after_run_of_the_tool_stores_the_current_fingerprint() {
    init_tracing();
    let h = scenario();

    h.checker.after_run(TOOL_PATH, 0);

    assert_eq!(stored(&h), Some(h.checker.current_fingerprint()));
    assert!(h.checker.before_run("SkyrimSE.exe"));
    assert!(h.prompt.questions().is_empty());
}

#[test]
fn after_run_of_other_applications_does_nothing() {
    init_tracing();
    let h = scenario();

    h.checker.after_run("SkyrimSE.exe", 0);

    assert_eq!(stored(&h), None);
}

#[test]
fn after_run_overwrites_regardless_of_previous_value() {
    init_tracing();
    let h = scenario();
    h.store.set(CHECKER_NAME, "Default", "old").unwrap();

    h.checker.after_run(TOOL_PATH, 0);

    assert_eq!(stored(&h), Some(h.checker.current_fingerprint()));
}

#[test]
fn tool_launched_by_its_real_path_is_recognised() {
    init_tracing();
    let h = scenario();
    let real = "/games/skyrim/Data/tools/GenerateFNIS_for_Users/GenerateFNISforUsers.exe";
    h.vfs.set_real_path(TOOL_PATH, real);

    assert!(h.checker.launches_tool(real, TOOL_PATH));
    assert!(!h.checker.launches_tool("/games/skyrim/SkyrimSE.exe", TOOL_PATH));

    // No question about the tool itself.
    assert!(h.checker.before_run(real));
    assert!(h.prompt.questions().is_empty());
    assert!(h.launcher.started().is_empty());

    // And its successful exit records the fingerprint.
    h.checker.after_run(real, 0);
    assert_eq!(stored(&h), Some(h.checker.current_fingerprint()));
    assert_eq!(h.checker.status(), CheckState::Fresh);
}

#[test]
fn real_path_match_survives_dot_segments_on_disk() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let tool = dir.path().join("GenerateFNISforUsers.exe");
    std::fs::write(&tool, "MZ")?;

    let h = scenario();
    h.vfs.set_real_path(TOOL_PATH, &tool);

    let roundabout = dir.path().join(".").join("GenerateFNISforUsers.exe");
    assert!(h.checker.launches_tool(&roundabout.to_string_lossy(), TOOL_PATH));
    Ok(())
}
