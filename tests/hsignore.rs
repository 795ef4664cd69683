//! `.hsignore` rules apply to folder uploads.

mod integration;

use std::sync::Arc;

use hsync::{Client, UploadOptions};
use integration::helpers::*;
use test_support::MockRemoteStore;

#[tokio::test]
async fn hsignore_rules_exclude_files_and_folders() {
    let dir = TestDir::new().expect("create test dir");
    let mut tree = FileTree::new();
    tree.text_file(".hsignore", "# local scratch\n*.txt\ndrafts/\n!keep.txt\n")
        .text_file("css/main.css", "a{}")
        .text_file("notes.txt", "todo")
        .text_file("keep.txt", "kept")
        .text_file("drafts/page.html", "<p></p>")
        .text_file("templates/drafts.html", "<p></p>");
    tree.create_in(&dir).expect("create tree");

    let store = Arc::new(MockRemoteStore::new());
    let results = Client::new(store.clone(), 123)
        .upload_folder(dir.path(), "theme", UploadOptions::default())
        .await
        .expect("upload");

    let mut targets = store.upload_targets();
    targets.sort();
    assert_eq!(
        targets,
        ["theme/css/main.css", "theme/keep.txt", "theme/templates/drafts.html"]
    );
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn explicit_rules_replace_discovery() {
    let dir = TestDir::new().expect("create test dir");
    let mut tree = FileTree::new();
    tree.text_file(".hsignore", "*.css\n")
        .text_file("css/main.css", "a{}")
        .text_file("theme.json", "{}");
    tree.create_in(&dir).expect("create tree");

    let store = Arc::new(MockRemoteStore::new());
    let options =
        UploadOptions::default().with_ignore(Arc::new(hsync::IgnoreRuleSet::with_domain(dir.path())));
    Client::new(store.clone(), 123)
        .upload_folder(dir.path(), "theme", options)
        .await
        .expect("upload");

    let mut targets = store.upload_targets();
    targets.sort();
    assert_eq!(targets, ["theme/css/main.css", "theme/theme.json"]);
}
