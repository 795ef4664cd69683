use std::path::{Path, PathBuf};

use proptest::prelude::*;
use transfer::partition;

fn relative_path() -> impl Strategy<Value = String> {
    let segment = "[a-z]{1,6}(\\.module)?";
    let file = "[a-z]{1,6}\\.(css|js|html|json|png|txt)";
    (prop::collection::vec(segment, 0..3), file)
        .prop_map(|(dirs, file)| {
            let mut parts = dirs;
            parts.push(file);
            parts.join("/")
        })
}

proptest! {
    #[test]
    fn partitioning_is_idempotent(files in prop::collection::vec(relative_path(), 0..40)) {
        let root = Path::new("/project");
        let files: Vec<PathBuf> = files.iter().map(|file| root.join(file)).collect();

        let first = partition(root, &files);
        let second = partition(root, &first.flatten());

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), files.len());
    }
}
