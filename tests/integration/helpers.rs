//! Scratch trees for integration tests.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A scratch directory removed on drop.
///
/// The directory name never starts with a dot, so the built-in `.*` ignore
/// rule does not swallow everything below it.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: test_support::scratch_dir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn mkdir(&self, relative: &str) -> io::Result<PathBuf> {
        let path = self.path().join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn write_file(&self, relative: &str, contents: &[u8]) -> io::Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_file(&self, relative: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path().join(relative))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path().join(relative).exists()
    }
}

/// Declarative description of files to create.
#[derive(Default)]
pub struct FileTree {
    files: Vec<(String, Vec<u8>)>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_file(&mut self, relative: &str, contents: &str) -> &mut Self {
        self.file(relative, contents.as_bytes())
    }

    pub fn file(&mut self, relative: &str, contents: &[u8]) -> &mut Self {
        self.files.push((relative.to_owned(), contents.to_vec()));
        self
    }

    pub fn create_in(&self, dir: &TestDir) -> io::Result<()> {
        self.create_at(dir.path())
    }

    pub fn create_at(&self, root: &Path) -> io::Result<()> {
        for (relative, contents) in &self.files {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)?;
        }
        Ok(())
    }
}

/// Every regular file below `root`, keyed by its `/`-separated relative
/// path.
pub fn files_below(root: &Path) -> io::Result<BTreeMap<String, Vec<u8>>> {
    let mut files = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                pending.push(path);
            } else {
                let relative = path
                    .strip_prefix(root)
                    .map_err(io::Error::other)?
                    .to_string_lossy()
                    .replace('\\', "/");
                files.insert(relative, fs::read(&path)?);
            }
        }
    }
    Ok(files)
}
