use super::*;
use chrono::TimeZone;

#[test]
fn quiet_level_keeps_warnings_only() {
    let directives = LogConfig::from_verbose_level(0).directives();
    assert!(directives.starts_with("warn"));
    assert!(directives.contains("hsync::upload=warn"));
    assert!(directives.contains("hsync::watch=warn"));
}

#[test]
fn level_one_shows_transfers_but_not_watch_noise() {
    let directives = LogConfig::from_verbose_level(1).directives();
    assert!(directives.contains("hsync::upload=info"));
    assert!(directives.contains("hsync::delete=info"));
    assert!(directives.contains("hsync::convert=warn"));
}

#[test]
fn high_levels_enable_trace() {
    let directives = LogConfig::from_verbose_level(5).directives();
    for target in LogTarget::ALL {
        assert!(directives.contains(&format!("{target}=trace")));
    }
}

#[test]
fn targets_are_namespaced() {
    for target in LogTarget::ALL {
        assert!(target.as_str().starts_with("hsync::"));
    }
}

#[test]
fn build_filter_accepts_generated_directives() {
    let filter = build_filter(&LogConfig::from_verbose_level(2));
    assert!(!filter.to_string().is_empty());
}

#[test]
fn entry_uses_iso_timestamp() {
    let at = chrono::Utc
        .with_ymd_and_hms(2024, 3, 1, 12, 30, 5)
        .single()
        .expect("valid timestamp");
    let line = ActivityLog::format_entry(at, "Uploaded", "theme/main.css");
    assert_eq!(line, "2024-03-01T12:30:05.000Z Uploaded: theme/main.css\n");
}

#[test]
fn append_creates_and_extends_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = ActivityLog::new(dir.path().join("activity.log"));

    log.append("first\n").expect("first append");
    log.append("second\n").expect("second append");

    let contents = std::fs::read_to_string(log.path()).expect("read log");
    assert_eq!(contents, "first\nsecond\n");
}

#[test]
fn append_reports_path_on_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = ActivityLog::new(dir.path().join("missing").join("activity.log"));

    let error = log.append("x").expect_err("parent directory is missing");
    assert_eq!(error.path(), log.path());
    assert!(error.to_string().contains("activity.log"));
}

#[cfg(feature = "serde")]
#[test]
fn config_and_targets_deserialize() {
    let config: LogConfig = serde_json::from_str(r#"{"verbosity": 2}"#).expect("config");
    assert_eq!(config.verbosity, 2);
    assert!(!config.show_targets);

    let target: LogTarget = serde_json::from_str(r#""upload""#).expect("target");
    assert_eq!(target, LogTarget::Upload);
}
