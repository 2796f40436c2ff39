// tests/match_rules.rs

mod common;
use crate::common::init_tracing;

use fnischeck::fingerprint::{MatchRule, RuleSet};
use fnischeck::vfs::VirtualFileRecord;

fn relevant(rules: &RuleSet, path: &str, sensitive: bool) -> bool {
    rules.is_relevant(&VirtualFileRecord::loose(path), sensitive)
}

#[test]
fn default_tier_matches_fnis_sources() {
    init_tracing();
    let rules = RuleSet::fnis().unwrap();

    for path in [
        "meshes\\actors\\character\\animations\\FNISBase\\FNIS_FNISBase_List.txt",
        "meshes\\actors\\character\\behaviors\\FNIS_Base_Behavior.txt",
        "meshes\\actors\\character\\animations\\FNISBehavior.txt",
        "meshes\\actors\\x\\PatchList.txt",
        "meshes\\actors\\character\\character assets\\skeleton.hkx",
        "meshes\\actors\\character\\character assets female\\skeleton_female.hkx",
    ] {
        assert!(relevant(&rules, path, false), "{path} should be relevant");
    }
}

#[test]
fn matching_ignores_case() {
    init_tracing();
    let rules = RuleSet::fnis().unwrap();

    assert!(relevant(&rules, "MESHES\\ACTORS\\X\\fnis_x_list.TXT", false));
    assert!(relevant(&rules, "meshes\\actors\\x\\SKELETON.HKX", false));
}

#[test]
fn patterns_are_anchored_at_the_end_of_the_path() {
    init_tracing();
    let rules = RuleSet::fnis().unwrap();

    assert!(!relevant(&rules, "meshes\\actors\\x\\FNIS_x_List.txt.bak", false));
    assert!(!relevant(&rules, "meshes\\actors\\x\\PatchList.txt\\readme.md", false));
    assert!(!relevant(&rules, "meshes\\actors\\x\\MyPatchList.txt", false));
    assert!(!relevant(&rules, "meshes\\actors\\x\\unrelated.txt", false));
}

#[test]
fn forward_slash_paths_do_not_match() {
    init_tracing();
    let rules = RuleSet::fnis().unwrap();

    assert!(!relevant(&rules, "meshes/actors/x/FNIS_x_List.txt", false));
}

#[test]
fn sensitive_tier_only_applies_when_enabled() {
    init_tracing();
    let rules = RuleSet::fnis().unwrap();
    let path = "meshes\\actors\\character\\animations\\mt_idle.hkx";

    assert!(!relevant(&rules, path, false));
    assert!(relevant(&rules, path, true));
}

#[test]
fn default_matches_do_not_depend_on_sensitive_flag() {
    init_tracing();
    let rules = RuleSet::fnis().unwrap();

    assert!(relevant(&rules, "meshes\\actors\\x\\PatchList.txt", true));
    assert!(relevant(&rules, "meshes\\actors\\x\\PatchList.txt", false));
}

#[test]
fn archive_sourced_files_are_never_relevant() {
    init_tracing();
    let rules = RuleSet::fnis().unwrap();

    let archived = VirtualFileRecord::archived("meshes\\actors\\x\\FNIS_x_List.txt", "Skyrim - Animations.bsa");
    assert!(archived.from_archive());
    assert!(!rules.is_relevant(&archived, false));
    assert!(!rules.is_relevant(&archived, true));

    // An empty archive name counts as a loose file.
    let loose = VirtualFileRecord::archived("meshes\\actors\\x\\FNIS_x_List.txt", "");
    assert!(!loose.from_archive());
    assert!(rules.is_relevant(&loose, false));
}

#[test]
fn custom_rule_sets_compile_and_report_bad_patterns() {
    init_tracing();

    let rules = RuleSet::from_patterns(&[r"\\custom\.txt$"], &[]).unwrap();
    assert_eq!(rules.default_rules().len(), 1);
    assert!(rules.sensitive_rules().is_empty());
    assert!(relevant(&rules, "a\\CUSTOM.txt", false));

    let err = MatchRule::new("(unclosed").unwrap_err();
    assert!(err.to_string().contains("Invalid match pattern"));
}
