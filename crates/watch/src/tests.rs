use std::path::PathBuf;
use std::time::Duration;

use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use remote::Environment;
use tokio::time::Instant;

use super::*;

#[test]
fn debouncer_waits_for_quiet_period() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(500));
    assert_eq!(debouncer.deadline(), None);
    assert!(!debouncer.is_due(start));

    debouncer.push_at("a", start);
    debouncer.push_at("b", start + Duration::from_millis(300));
    assert!(!debouncer.is_due(start + Duration::from_millis(600)));
    assert!(debouncer.is_due(start + Duration::from_millis(800)));
    assert_eq!(debouncer.len(), 2);

    assert_eq!(debouncer.take(), ["a", "b"]);
    assert!(debouncer.is_empty());
    assert_eq!(debouncer.deadline(), None);
}

#[test]
fn postponed_batch_keeps_items_and_moves_deadline() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(100));
    debouncer.postpone_at(start);
    assert_eq!(debouncer.deadline(), None);

    debouncer.push_at(PathBuf::from("a.css"), start);
    debouncer.postpone_at(start + Duration::from_millis(100));
    assert!(!debouncer.is_due(start + Duration::from_millis(150)));
    assert!(debouncer.is_due(start + Duration::from_millis(200)));
    assert_eq!(debouncer.take(), [PathBuf::from("a.css")]);
}

#[test]
fn only_remote_changes_count_as_success() {
    let uploaded = ActionOutcome::Uploaded {
        local: PathBuf::from("/p/a.css"),
        remote: "t/a.css".into(),
    };
    let deleted = ActionOutcome::Deleted {
        remote: "t/a.css".into(),
    };
    let skipped = ActionOutcome::Skipped {
        path: PathBuf::from("/p/fields.js"),
        reason: "rejected".into(),
    };
    let failed = ActionOutcome::Failed(WatchFailure {
        path: PathBuf::from("/p/a.css"),
        remote_path: "t/a.css".into(),
        message: "boom".into(),
    });
    assert!(uploaded.is_success());
    assert!(deleted.is_success());
    assert!(!skipped.is_success());
    assert!(!failed.is_success());
}

#[tokio::test(start_paused = true)]
async fn sleep_until_due_fires_at_deadline() {
    let mut debouncer = Debouncer::new(Duration::from_millis(500));
    debouncer.push(1);
    let started = Instant::now();
    sleep_until_due(debouncer.deadline()).await;
    assert!(started.elapsed() >= Duration::from_millis(500));
}

fn mapped(kind: EventKind, path: &str) -> Vec<WatchEvent> {
    WatchEvent::from_notify(&Event::new(kind).add_path(PathBuf::from(path)))
}

#[test]
fn create_and_modify_map_to_add_and_change() {
    assert_eq!(
        mapped(EventKind::Create(CreateKind::File), "/nonexistent/a.css"),
        [WatchEvent::add("/nonexistent/a.css")]
    );
    assert_eq!(
        mapped(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            "/nonexistent/a.css"
        ),
        [WatchEvent::change("/nonexistent/a.css")]
    );
}

#[test]
fn folder_creation_and_metadata_changes_are_dropped() {
    assert!(mapped(EventKind::Create(CreateKind::Folder), "/nonexistent/dir").is_empty());
    assert!(
        mapped(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            "/nonexistent/a.css"
        )
        .is_empty()
    );
}

#[test]
fn removals_distinguish_folders() {
    assert_eq!(
        mapped(EventKind::Remove(RemoveKind::File), "/nonexistent/a.css"),
        [WatchEvent::unlink("/nonexistent/a.css")]
    );
    assert_eq!(
        mapped(EventKind::Remove(RemoveKind::Folder), "/nonexistent/css"),
        [WatchEvent::unlink_dir("/nonexistent/css")]
    );
}

#[test]
fn renames_split_into_unlink_and_add() {
    let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
        .add_path(PathBuf::from("/nonexistent/old.css"))
        .add_path(PathBuf::from("/nonexistent/new.css"));
    assert_eq!(
        WatchEvent::from_notify(&event),
        [
            WatchEvent::unlink("/nonexistent/old.css"),
            WatchEvent::add("/nonexistent/new.css"),
        ]
    );
    assert_eq!(
        mapped(EventKind::Modify(ModifyKind::Name(RenameMode::From)), "/nonexistent/css"),
        [WatchEvent::unlink_dir("/nonexistent/css")]
    );
}

#[test]
fn preview_url_depends_on_environment() {
    let prod = theme_preview_url(123, Environment::Prod, "my theme").expect("prod url");
    assert_eq!(
        prod.as_str(),
        "https://app.hubspot.com/theme-previewer/123/edit/my%20theme"
    );
    let qa = theme_preview_url(123, Environment::Qa, "growth").expect("qa url");
    assert_eq!(qa.as_str(), "https://app.hubspotqa.com/theme-previewer/123/edit/growth");
}

#[test]
fn theme_name_comes_from_nearest_theme_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let theme = dir.path().join("growth");
    std::fs::create_dir_all(theme.join("css")).expect("theme dirs");
    std::fs::write(theme.join("theme.json"), "{}").expect("theme.json");

    assert_eq!(
        find_theme_name(dir.path(), &theme.join("css/main.css")),
        Some("growth".to_owned())
    );
    assert_eq!(find_theme_name(dir.path(), &dir.path().join("loose.css")), None);
    assert_eq!(find_theme_name(&theme.join("css"), &theme.join("css/main.css")), None);
}

#[test]
fn only_successes_produce_activity() {
    let uploaded = ActionOutcome::Uploaded {
        local: PathBuf::from("/p/a.css"),
        remote: "theme/a.css".into(),
    };
    assert_eq!(
        uploaded.activity_entry(),
        Some(ActivityEntry {
            action: ActivityAction::Uploaded,
            remote_path: "theme/a.css".into(),
        })
    );
    let skipped = ActionOutcome::Skipped {
        path: PathBuf::from("/p/fields.js"),
        reason: "rejected".into(),
    };
    assert_eq!(skipped.activity_entry(), None);
}

#[test]
fn states_move_forward() {
    assert!(WatchState::Initializing < WatchState::InitialSync);
    assert!(WatchState::InitialSync < WatchState::Watching);
    assert!(WatchState::Watching < WatchState::Stopped);
}
