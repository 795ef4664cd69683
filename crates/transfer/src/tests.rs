use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use remote::{RemoteError, RemoteNode};

use super::*;

#[test]
fn categories_follow_priority_order() {
    let mut sorted = FileCategory::ORDER.to_vec();
    sorted.sort();
    assert_eq!(sorted, FileCategory::ORDER);
}

#[test]
fn module_members_beat_extension_rules() {
    assert_eq!(FileCategory::of(Path::new("cards.module/module.css")), FileCategory::Module);
    assert_eq!(FileCategory::of(Path::new("cards.module/meta.json")), FileCategory::Module);
    assert_eq!(FileCategory::of(Path::new("css/main.css")), FileCategory::CssAndJs);
    assert_eq!(FileCategory::of(Path::new("js/app.js")), FileCategory::CssAndJs);
    assert_eq!(FileCategory::of(Path::new("templates/page.html")), FileCategory::Template);
    assert_eq!(FileCategory::of(Path::new("theme.json")), FileCategory::Json);
    assert_eq!(FileCategory::of(Path::new("images/logo.png")), FileCategory::Other);
}

#[test]
fn partition_keeps_input_order_within_category() {
    let root = Path::new("/theme");
    let files = [
        PathBuf::from("/theme/b.css"),
        PathBuf::from("/theme/logo.png"),
        PathBuf::from("/theme/a.css"),
        PathBuf::from("/theme/fields.json"),
    ];
    let partition = partition(root, &files);
    assert_eq!(
        partition.files(FileCategory::CssAndJs),
        [PathBuf::from("/theme/b.css"), PathBuf::from("/theme/a.css")]
    );
    assert_eq!(
        partition.flatten(),
        [
            PathBuf::from("/theme/logo.png"),
            PathBuf::from("/theme/b.css"),
            PathBuf::from("/theme/a.css"),
            PathBuf::from("/theme/fields.json"),
        ]
    );
    assert_eq!(partition.len(), 4);
    assert!(partition.files(FileCategory::Template).is_empty());
}

#[test]
fn fatal_remote_errors_map_to_fatal() {
    let error = TransferError::from(RemoteError::from_status("/a.css", 403, "forbidden"));
    assert!(error.is_fatal());
    let error = TransferError::from(RemoteError::from_status("/a.css", 400, "bad"));
    assert!(error.is_retryable());
    assert!(!error.is_fatal());
}

#[test]
fn results_track_attempts() {
    let mut result = TransferResult::new(PathBuf::from("/a.css"), "a.css".into());
    assert_eq!(result.outcome(), TransferOutcome::Skipped);
    result.record_attempt(Some("boom".into()));
    assert_eq!(result.outcome(), TransferOutcome::Failure);
    result.record_attempt(None);
    assert!(result.is_success());
    assert_eq!(result.attempts(), 2);
    assert_eq!(result.error(), None);
}

fn sample_tree() -> RemoteNode {
    RemoteNode::folder(
        "theme",
        "/theme",
        vec![
            RemoteNode::folder(
                "css",
                "/theme/css",
                vec![RemoteNode::file("main.css", "/theme/css/main.css")],
            ),
            RemoteNode::file("theme.json", "/theme/theme.json"),
        ],
    )
}

#[test]
fn traversal_is_pre_order() {
    let mut seen = Vec::new();
    let flow = traverse(&sample_tree(), &mut |node| {
        seen.push(node.path().to_owned());
        ControlFlow::Continue(())
    });
    assert_eq!(flow, ControlFlow::Continue(()));
    assert_eq!(
        seen,
        ["/theme", "/theme/css", "/theme/css/main.css", "/theme/theme.json"]
    );
}

#[test]
fn break_stops_deeper_and_later_nodes() {
    let mut seen = Vec::new();
    let flow = traverse(&sample_tree(), &mut |node| {
        seen.push(node.path().to_owned());
        if node.path() == "/theme/css" {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(flow, ControlFlow::Break(()));
    assert_eq!(seen, ["/theme", "/theme/css"]);
}

#[tokio::test]
async fn queue_is_idle_when_empty() {
    let queue = TransferQueue::new();
    queue.on_idle().await;
    assert!(queue.is_idle());
    assert_eq!(queue.concurrency(), DEFAULT_CONCURRENCY);
}

#[tokio::test]
async fn queue_returns_job_output() {
    let queue = TransferQueue::new();
    let completion = queue.submit(async { 40 + 2 });
    assert_eq!(completion.await, Some(42));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queue_caps_concurrency() {
    let queue = TransferQueue::with_concurrency(3);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let completions: Vec<_> = (0..20)
        .map(|_| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            queue.submit(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect();
    queue.on_idle().await;

    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert!(queue.is_idle());
    for completion in completions {
        assert_eq!(completion.await, Some(()));
    }
}

#[tokio::test]
async fn queue_starts_jobs_in_submission_order() {
    let queue = TransferQueue::with_concurrency(1);
    let order = Arc::new(Mutex::new(Vec::new()));
    for index in 0..8 {
        let order = Arc::clone(&order);
        let _ = queue.submit(async move {
            order.lock().expect("order lock").push(index);
        });
    }
    queue.on_idle().await;
    assert_eq!(*order.lock().expect("order lock"), (0..8).collect::<Vec<_>>());
}

#[tokio::test]
async fn closed_queue_refuses_work() {
    let queue = TransferQueue::new();
    queue.close();
    assert!(queue.is_closed());
    assert_eq!(queue.submit(async { 1 }).await, None);
    queue.on_idle().await;
}

fn explode() -> u8 {
    panic!("job failure")
}

#[tokio::test]
async fn panicking_job_does_not_wedge_the_queue() {
    let queue = TransferQueue::new();
    let completion = queue.submit(async { explode() });
    queue.on_idle().await;
    assert_eq!(completion.await, None);
    assert!(queue.is_idle());
}

#[test]
fn walk_prunes_ignored_directories() {
    let dir = test_support::scratch_dir().expect("scratch dir");
    let root = dir.path();
    std::fs::create_dir_all(root.join("css")).expect("css dir");
    std::fs::create_dir_all(root.join("node_modules/pkg")).expect("node_modules");
    std::fs::write(root.join("css/main.css"), "body{}").expect("css");
    std::fs::write(root.join("node_modules/pkg/index.js"), "").expect("pkg");
    std::fs::write(root.join("debug.log"), "").expect("log");
    std::fs::write(root.join("theme.json"), "{}").expect("theme");

    let rules = filters::IgnoreRuleSet::with_domain(root);
    let files = collect_local_files(root, Some(&rules), false).expect("walk");
    assert_eq!(files, [root.join("css/main.css"), root.join("theme.json")]);

    let everything = collect_local_files(root, None, false).expect("walk");
    assert_eq!(everything.len(), 4);
}
