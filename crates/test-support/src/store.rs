use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use remote::{IoResultExt, QueryValues, RemoteError, RemoteNode, RemoteStore};

/// Store operation a failure can be scripted for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`RemoteStore::upload_file`].
    Upload,
    /// [`RemoteStore::download_stream`].
    DownloadStream,
    /// [`RemoteStore::download_tree`] and
    /// [`RemoteStore::download_default_tree`].
    DownloadTree,
    /// [`RemoteStore::delete_remote`].
    Delete,
}

/// Scripted failure kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    /// HTTP 400, retried by callers.
    Retryable,
    /// HTTP 401, aborts batches.
    Fatal,
}

/// One recorded store call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockCall {
    /// An upload.
    Upload {
        /// Local source.
        local: PathBuf,
        /// Remote destination as passed by the caller.
        remote: String,
    },
    /// A file stream download.
    DownloadStream {
        /// Remote source.
        remote: String,
        /// Local destination.
        dest: PathBuf,
    },
    /// A tree listing.
    DownloadTree {
        /// Remote source.
        remote: String,
        /// Whether the default-content endpoint was used.
        default_content: bool,
    },
    /// A deletion.
    Delete {
        /// Remote path.
        remote: String,
    },
}

#[derive(Debug, Default)]
struct MockState {
    files: BTreeMap<String, (Vec<u8>, i64, i64)>,
    failures: HashMap<(Operation, String), (Failure, usize)>,
    calls: Vec<MockCall>,
}

/// In-memory [`RemoteStore`].
///
/// Remote paths are keyed without their leading `/`. Folders exist
/// implicitly when a file lives below them.
#[derive(Debug, Default)]
pub struct MockRemoteStore {
    state: Mutex<MockState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn key(remote_path: &str) -> String {
    remote_path
        .trim()
        .replace('\\', "/")
        .trim_matches('/')
        .to_owned()
}

fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

impl MockRemoteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call sleep for `delay` while counted as in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Seeds a remote file.
    pub fn insert_file(&self, remote_path: &str, contents: impl Into<Vec<u8>>) {
        self.insert_file_with_times(remote_path, contents, 0, 0);
    }

    /// Seeds a remote file with creation and modification times (epoch ms).
    pub fn insert_file_with_times(
        &self,
        remote_path: &str,
        contents: impl Into<Vec<u8>>,
        created_at: i64,
        updated_at: i64,
    ) {
        self.lock()
            .files
            .insert(key(remote_path), (contents.into(), created_at, updated_at));
    }

    /// Fails the next `times` calls of `operation` on `remote_path`.
    pub fn fail(&self, operation: Operation, remote_path: &str, failure: Failure, times: usize) {
        self.lock()
            .failures
            .insert((operation, key(remote_path)), (failure, times));
    }

    /// Fails the next upload of `remote_path` with a retryable error.
    pub fn fail_upload_once(&self, remote_path: &str) {
        self.fail(Operation::Upload, remote_path, Failure::Retryable, 1);
    }

    /// Fails every upload of `remote_path` with a retryable error.
    pub fn fail_upload_always(&self, remote_path: &str) {
        self.fail(Operation::Upload, remote_path, Failure::Retryable, usize::MAX);
    }

    /// Fails uploads of `remote_path` with an authorization error.
    pub fn fail_upload_fatal(&self, remote_path: &str) {
        self.fail(Operation::Upload, remote_path, Failure::Fatal, usize::MAX);
    }

    /// Stored files keyed by remote path (without leading `/`).
    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        self.lock()
            .files
            .iter()
            .map(|(key, (contents, _, _))| (key.clone(), contents.clone()))
            .collect()
    }

    /// Contents of one stored file.
    pub fn file(&self, remote_path: &str) -> Option<Vec<u8>> {
        self.lock()
            .files
            .get(&key(remote_path))
            .map(|(contents, _, _)| contents.clone())
    }

    /// Every call in the order it started.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Remote destinations of upload calls in the order they started.
    pub fn upload_targets(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Upload { remote, .. } => Some(remote.clone()),
                _ => None,
            })
            .collect()
    }

    /// Local sources of upload calls in the order they started.
    pub fn upload_sources(&self) -> Vec<PathBuf> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Upload { local, .. } => Some(local.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of upload calls that targeted `remote_path`.
    pub fn upload_attempts(&self, remote_path: &str) -> usize {
        let wanted = key(remote_path);
        self.upload_targets()
            .iter()
            .filter(|remote| key(remote) == wanted)
            .count()
    }

    /// Remote paths of delete calls.
    pub fn deleted(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Delete { remote } => Some(remote.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of calls currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn begin(&self, call: MockCall) -> InFlight<'_> {
        self.lock().calls.push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        guard
    }

    fn scripted_failure(&self, operation: Operation, remote_path: &str) -> Option<RemoteError> {
        let mut state = self.lock();
        let entry = state.failures.get_mut(&(operation, key(remote_path)))?;
        if entry.1 == 0 {
            return None;
        }
        entry.1 = entry.1.saturating_sub(1);
        Some(match entry.0 {
            Failure::Retryable => RemoteError::from_status(remote_path, 400, "scripted failure"),
            Failure::Fatal => RemoteError::from_status(remote_path, 401, "scripted auth failure"),
        })
    }

    fn tree(&self, remote_path: &str) -> Result<RemoteNode, RemoteError> {
        let root = key(remote_path);
        let state = self.lock();
        if let Some((_, created, updated)) = state.files.get(&root) {
            return Ok(RemoteNode::file(basename(&root), format!("/{root}"))
                .with_timestamps(*created, *updated));
        }

        let prefix = if root.is_empty() {
            String::new()
        } else {
            format!("{root}/")
        };
        let entries: Vec<(&str, i64, i64)> = state
            .files
            .iter()
            .filter_map(|(key, (_, created, updated))| {
                key.strip_prefix(&prefix)
                    .map(|rest| (rest, *created, *updated))
            })
            .collect();
        if entries.is_empty() && !root.is_empty() {
            return Err(RemoteError::from_status(remote_path, 404, "no such path"));
        }
        Ok(build_folder(basename(&root), &root, &entries))
    }
}

fn build_folder(name: &str, path: &str, entries: &[(&str, i64, i64)]) -> RemoteNode {
    let mut files = Vec::new();
    let mut folders: BTreeMap<&str, Vec<(&str, i64, i64)>> = BTreeMap::new();
    for &(relative, created, updated) in entries {
        match relative.split_once('/') {
            Some((folder, rest)) => {
                folders
                    .entry(folder)
                    .or_default()
                    .push((rest, created, updated));
            }
            None => files.push((relative, created, updated)),
        }
    }

    let child_path = |child: &str| {
        if path.is_empty() {
            format!("/{child}")
        } else {
            format!("/{path}/{child}")
        }
    };
    let mut children: Vec<RemoteNode> = folders
        .iter()
        .map(|(&folder, nested)| {
            let nested_path = child_path(folder);
            build_folder(folder, nested_path.trim_start_matches('/'), nested)
        })
        .collect();
    children.extend(files.into_iter().map(|(file, created, updated)| {
        RemoteNode::file(file, child_path(file)).with_timestamps(created, updated)
    }));
    RemoteNode::folder(name, format!("/{path}"), children)
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn upload_file(
        &self,
        _account_id: u64,
        local_path: &Path,
        remote_path: &str,
        _query: &QueryValues,
    ) -> Result<(), RemoteError> {
        let _guard = self
            .begin(MockCall::Upload {
                local: local_path.to_path_buf(),
                remote: remote_path.to_owned(),
            })
            .await;
        if let Some(error) = self.scripted_failure(Operation::Upload, remote_path) {
            return Err(error);
        }
        let contents = tokio::fs::read(local_path)
            .await
            .with_path(local_path, "read")?;
        self.insert_file(remote_path, contents);
        Ok(())
    }

    async fn download_stream(
        &self,
        _account_id: u64,
        remote_path: &str,
        local_dest: &Path,
        _query: &QueryValues,
    ) -> Result<RemoteNode, RemoteError> {
        let _guard = self
            .begin(MockCall::DownloadStream {
                remote: remote_path.to_owned(),
                dest: local_dest.to_path_buf(),
            })
            .await;
        if let Some(error) = self.scripted_failure(Operation::DownloadStream, remote_path) {
            return Err(error);
        }
        let key = key(remote_path);
        let stored = self.lock().files.get(&key).cloned();
        let Some((contents, created, updated)) = stored else {
            return Err(RemoteError::from_status(remote_path, 404, "no such file"));
        };
        tokio::fs::write(local_dest, contents)
            .await
            .with_path(local_dest, "write")?;
        Ok(RemoteNode::file(basename(&key), format!("/{key}")).with_timestamps(created, updated))
    }

    async fn download_tree(
        &self,
        _account_id: u64,
        remote_path: &str,
        _query: &QueryValues,
    ) -> Result<RemoteNode, RemoteError> {
        let _guard = self
            .begin(MockCall::DownloadTree {
                remote: remote_path.to_owned(),
                default_content: false,
            })
            .await;
        if let Some(error) = self.scripted_failure(Operation::DownloadTree, remote_path) {
            return Err(error);
        }
        self.tree(remote_path)
    }

    async fn download_default_tree(
        &self,
        _account_id: u64,
        remote_path: &str,
        _query: &QueryValues,
    ) -> Result<RemoteNode, RemoteError> {
        let _guard = self
            .begin(MockCall::DownloadTree {
                remote: remote_path.to_owned(),
                default_content: true,
            })
            .await;
        if let Some(error) = self.scripted_failure(Operation::DownloadTree, remote_path) {
            return Err(error);
        }
        self.tree(remote_path)
    }

    async fn delete_remote(&self, _account_id: u64, remote_path: &str) -> Result<(), RemoteError> {
        let _guard = self
            .begin(MockCall::Delete {
                remote: remote_path.to_owned(),
            })
            .await;
        if let Some(error) = self.scripted_failure(Operation::Delete, remote_path) {
            return Err(error);
        }
        let root = key(remote_path);
        let prefix = format!("{root}/");
        let mut state = self.lock();
        let before = state.files.len();
        state
            .files
            .retain(|key, _| *key != root && !key.starts_with(&prefix));
        if state.files.len() == before {
            return Err(RemoteError::from_status(remote_path, 404, "no such path"));
        }
        Ok(())
    }
}
