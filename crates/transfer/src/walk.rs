use std::fs;
use std::path::{Path, PathBuf};

use filters::IgnoreRuleSet;
use remote::{FileSystemError, IoResultExt};

/// Lists every file below `root`, sorted and depth-first.
///
/// Ignored directories are pruned without being read and ignored files are
/// left out. Symbolic links are not followed. `in_project` is forwarded to
/// [`IgnoreRuleSet::should_ignore`].
pub fn collect_local_files(
    root: &Path,
    ignore: Option<&IgnoreRuleSet>,
    in_project: bool,
) -> Result<Vec<PathBuf>, FileSystemError> {
    let mut files = Vec::new();
    if root.is_file() {
        files.push(root.to_path_buf());
        return Ok(files);
    }
    walk(root, ignore, in_project, &mut files)?;
    Ok(files)
}

fn walk(
    dir: &Path,
    ignore: Option<&IgnoreRuleSet>,
    in_project: bool,
    files: &mut Vec<PathBuf>,
) -> Result<(), FileSystemError> {
    let mut entries = fs::read_dir(dir)
        .with_path(dir, "read directory")?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .with_path(dir, "read directory")?;
    entries.sort();

    for path in entries {
        let file_type = fs::symlink_metadata(&path)
            .with_path(&path, "stat")?
            .file_type();
        if file_type.is_dir() {
            if ignore.is_some_and(|rules| rules.should_ignore_dir(&path, in_project)) {
                continue;
            }
            walk(&path, ignore, in_project, files)?;
        } else if file_type.is_file()
            && !ignore.is_some_and(|rules| rules.should_ignore(&path, in_project))
        {
            files.push(path);
        }
    }
    Ok(())
}
