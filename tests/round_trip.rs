//! Uploading a tree and downloading it again restores it, minus ignored
//! files.

mod integration;

use std::sync::Arc;

use hsync::{Client, DownloadOptions, DownloadStatus, TransferOutcome, UploadOptions};
use integration::helpers::*;
use test_support::MockRemoteStore;

fn theme() -> FileTree {
    let mut tree = FileTree::new();
    tree.text_file("theme.json", r#"{"label":"Growth"}"#)
        .text_file("css/main.css", "body { margin: 0 }")
        .text_file("templates/page.html", "<html></html>")
        .text_file("modules/card.module/module.html", "<div></div>")
        .text_file("modules/card.module/fields.json", "[]")
        .text_file("modules/card.module/meta.json", "{}")
        .text_file("notes.txt", "remember")
        .file("images/logo.png", &[0x89, b'P', b'N', b'G', 0, 0xff, 0x10]);
    tree
}

fn ignored() -> FileTree {
    let mut tree = FileTree::new();
    tree.text_file("debug.log", "noise")
        .text_file(".env", "SECRET=1")
        .text_file("node_modules/lib/index.js", "module.exports = 1")
        .text_file("package-lock.json", "{}")
        .text_file("css/.main.css.swp", "swap");
    tree
}

#[tokio::test]
async fn download_restores_uploaded_tree() {
    let dir = TestDir::new().expect("create test dir");
    let source = dir.mkdir("source").expect("source dir");
    let restored = dir.mkdir("restored").expect("restored dir");
    theme().create_at(&source).expect("theme files");
    ignored().create_at(&source).expect("ignored files");

    let store = Arc::new(MockRemoteStore::new());
    let client = Client::new(store.clone(), 123);

    let results = client
        .upload_folder(&source, "growth", UploadOptions::default())
        .await
        .expect("upload");
    assert_eq!(results.len(), 8);
    assert!(
        results
            .iter()
            .all(|result| result.outcome() == TransferOutcome::Success),
        "{results:?}"
    );

    let report = client
        .download(
            "growth",
            &restored,
            DownloadOptions::default().with_working_dir(dir.path()),
        )
        .await
        .expect("download");
    assert_eq!(report.status(), DownloadStatus::Complete);

    let expected = files_below(&source)
        .expect("list source")
        .into_iter()
        .filter(|(relative, _)| {
            !matches!(
                relative.as_str(),
                "debug.log"
                    | ".env"
                    | "node_modules/lib/index.js"
                    | "package-lock.json"
                    | "css/.main.css.swp"
            )
        })
        .collect::<std::collections::BTreeMap<_, _>>();
    assert_eq!(files_below(&restored).expect("list restored"), expected);
}

#[tokio::test]
async fn second_download_skips_existing_files() {
    let dir = TestDir::new().expect("create test dir");
    let source = dir.mkdir("source").expect("source dir");
    let restored = dir.mkdir("restored").expect("restored dir");
    theme().create_at(&source).expect("theme files");

    let store = Arc::new(MockRemoteStore::new());
    let client = Client::new(store, 123);
    client
        .upload_folder(&source, "growth", UploadOptions::default())
        .await
        .expect("upload");

    let options = DownloadOptions::default().with_working_dir(dir.path());
    let first = client
        .download("growth", &restored, options.clone())
        .await
        .expect("first download");
    assert_eq!(first.written().len(), 8);

    let second = client
        .download("growth", &restored, options)
        .await
        .expect("second download");
    assert!(second.written().is_empty());
    assert_eq!(second.skipped().len(), 8);
}
