//! `.hsignore` discovery, search domains and runtime paths.

use std::fs;
use std::path::Path;

use filters::{IGNORE_FILE_NAME, IgnoreRuleSet};
use tempfile::TempDir;

fn scratch() -> TempDir {
    tempfile::Builder::new()
        .prefix("hsync-filters-")
        .tempdir()
        .expect("tempdir")
}

#[test]
fn hsignore_log_pattern_excludes_logs_anywhere_in_domain() {
    let dir = scratch();
    fs::write(dir.path().join(IGNORE_FILE_NAME), "*.log\n").expect("write hsignore");
    let nested = dir.path().join("theme/modules");
    fs::create_dir_all(&nested).expect("mkdir");

    let rules = IgnoreRuleSet::with_start_dir(&nested);
    assert!(rules.should_ignore(&dir.path().join("debug.log"), true));
    assert!(rules.should_ignore(&nested.join("debug.log"), true));
    assert!(!rules.should_ignore(&nested.join("main.css"), true));
    assert_eq!(rules.search_domain().as_deref(), Some(dir.path()));
    assert_eq!(
        rules.ignore_file(),
        Some(dir.path().join(IGNORE_FILE_NAME))
    );
}

#[test]
fn domain_relative_anchoring() {
    let dir = scratch();
    fs::write(dir.path().join(IGNORE_FILE_NAME), "/drafts\n").expect("write hsignore");

    let rules = IgnoreRuleSet::with_start_dir(dir.path());
    assert!(rules.should_ignore(&dir.path().join("drafts/page.html"), true));
    assert!(!rules.should_ignore(&dir.path().join("theme/drafts/page.html"), true));
}

#[test]
fn hsignore_can_reinclude_default_exclusions() {
    let dir = scratch();
    fs::write(dir.path().join(IGNORE_FILE_NAME), "!.well-known\n").expect("write hsignore");

    let rules = IgnoreRuleSet::with_start_dir(dir.path());
    assert!(!rules.should_ignore(&dir.path().join(".well-known"), true));
    assert!(rules.should_ignore(&dir.path().join(".env"), true));
}

#[test]
fn invalid_patterns_do_not_poison_the_load() {
    let dir = scratch();
    fs::write(dir.path().join(IGNORE_FILE_NAME), "[\n*.tmp\n").expect("write hsignore");

    let rules = IgnoreRuleSet::with_start_dir(dir.path());
    assert!(rules.should_ignore(&dir.path().join("a.tmp"), true));
    assert!(!rules.should_ignore(&dir.path().join("a.css"), true));
}

#[test]
fn missing_hsignore_leaves_defaults_only() {
    let dir = scratch();
    let rules = IgnoreRuleSet::with_domain(dir.path());
    assert!(rules.should_ignore(&dir.path().join("node_modules/x.js"), true));
    assert!(!rules.should_ignore(&dir.path().join("debug.txt"), true));
    assert!(rules.ignore_file().is_none());
}

#[test]
fn the_domain_itself_is_never_ignored() {
    let dir = scratch();
    let rules = IgnoreRuleSet::with_domain(dir.path().join(".hidden"));
    assert!(!rules.should_ignore(&dir.path().join(".hidden"), true));
}

#[test]
fn relative_paths_resolve_against_the_domain() {
    let dir = scratch();
    let rules = IgnoreRuleSet::with_domain(dir.path());
    assert!(rules.should_ignore(Path::new("css/main.css.swp"), true));
    assert!(!rules.should_ignore(Path::new("css/main.css"), true));
}

#[test]
fn runtime_pattern_protects_one_path() {
    let dir = scratch();
    let rules = IgnoreRuleSet::with_domain(dir.path());
    let activity = dir.path().join("activity.txt");

    assert!(!rules.should_ignore(&activity, true));
    rules.add_runtime_pattern(&activity);
    assert!(rules.should_ignore(&activity, true));
    assert!(!rules.should_ignore(&dir.path().join("other.txt"), true));
}

#[test]
fn runtime_pattern_added_before_load_survives_loading() {
    let dir = scratch();
    let rules = IgnoreRuleSet::with_domain(dir.path());
    let activity = dir.path().join("activity.txt");

    rules.add_runtime_pattern(&activity);
    rules.load(true);
    assert!(rules.should_ignore(&activity, true));
}

#[test]
fn first_query_decides_project_context() {
    let dir = scratch();
    let lockfile = dir.path().join("package-lock.json");

    let outside = IgnoreRuleSet::with_domain(dir.path());
    assert!(outside.should_ignore(&lockfile, false));
    assert!(outside.should_ignore(&lockfile, true));

    let inside = IgnoreRuleSet::with_domain(dir.path());
    assert!(!inside.should_ignore(&lockfile, true));
    assert!(!inside.should_ignore(&lockfile, false));
}

#[test]
fn directory_queries_prune_dir_only_rules() {
    let dir = scratch();
    fs::write(dir.path().join(IGNORE_FILE_NAME), "build/\n").expect("write hsignore");

    let rules = IgnoreRuleSet::with_start_dir(dir.path());
    assert!(rules.should_ignore_dir(&dir.path().join("build"), true));
    assert!(!rules.should_ignore(&dir.path().join("build"), true));
    assert!(rules.should_ignore(&dir.path().join("build/app.js"), true));
}
