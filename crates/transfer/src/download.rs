//! Remote file and folder materialization.

use std::ops::ControlFlow;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use filetime::FileTime;
use logging::trace_download;
use remote::{
    Environment, FileSystemError, IoResultExt, PublishMode, QueryValues, RemoteNode, RemoteStore,
};

use crate::error::TransferError;
use crate::queue::{Completion, DEFAULT_CONCURRENCY, TransferQueue};

/// Settings for [`download_path`].
#[derive(Clone, Debug)]
pub struct DownloadOptions {
    /// Replace existing local files instead of skipping them.
    pub overwrite: bool,
    /// Source environment.
    pub environment: Environment,
    /// Directory that counts as "here" when resolving the destination.
    /// Defaults to the process working directory.
    pub working_dir: Option<PathBuf>,
    /// Queue concurrency ceiling.
    pub concurrency: usize,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            environment: Environment::default(),
            working_dir: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl DownloadOptions {
    /// Enables or disables overwriting.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets the source environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the directory treated as the working directory.
    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(working_dir.into());
        self
    }

    /// Overrides the concurrency ceiling.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Whether every node of a download succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadStatus {
    /// Every node was written or skipped.
    Complete,
    /// At least one node failed. Written files are kept.
    Incomplete,
}

/// One node that could not be materialized.
#[derive(Debug)]
pub struct DownloadFailure {
    /// Remote path of the node.
    pub remote_path: String,
    /// Why it failed.
    pub error: TransferError,
}

/// Summary of a [`download_path`] call.
#[derive(Debug)]
pub struct DownloadReport {
    status: DownloadStatus,
    destination: PathBuf,
    written: Vec<PathBuf>,
    skipped: Vec<PathBuf>,
    directories: Vec<PathBuf>,
    failures: Vec<DownloadFailure>,
}

impl DownloadReport {
    fn new(destination: PathBuf) -> Self {
        Self {
            status: DownloadStatus::Complete,
            destination,
            written: Vec::new(),
            skipped: Vec::new(),
            directories: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Overall status.
    pub fn status(&self) -> DownloadStatus {
        self.status
    }

    /// Returns `true` for [`DownloadStatus::Complete`].
    pub fn is_complete(&self) -> bool {
        self.status == DownloadStatus::Complete
    }

    /// Local file or folder the source was materialized as.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Files written.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Files left alone because they already existed.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    /// Directories created or confirmed.
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Nodes that failed.
    pub fn failures(&self) -> &[DownloadFailure] {
        &self.failures
    }
}

enum Materialized {
    Directory(PathBuf),
    Written(PathBuf),
    Skipped(PathBuf),
}

/// Downloads `remote_src` into `local_dest`.
///
/// A file-like source is streamed straight to disk. A folder-like source is
/// listed once and materialized node by node on a bounded queue. Errors that
/// prevent the download from starting (listing failures, a failed
/// single-file stream) are returned; per-node failures make the report
/// [`DownloadStatus::Incomplete`].
pub async fn download_path(
    store: Arc<dyn RemoteStore>,
    account_id: u64,
    remote_src: &str,
    local_dest: &Path,
    mode: PublishMode,
    options: &DownloadOptions,
) -> Result<DownloadReport, TransferError> {
    let working_dir = match &options.working_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().with_path(".", "resolve working directory")?,
    };
    let query = QueryValues::new(mode, options.environment);

    if paths::is_file(remote_src) {
        download_file(
            store.as_ref(),
            account_id,
            remote_src,
            local_dest,
            &working_dir,
            &query,
            options,
        )
        .await
    } else {
        download_folder(
            store,
            account_id,
            remote_src,
            local_dest,
            &working_dir,
            query,
            options,
        )
        .await
    }
}

async fn download_file(
    store: &dyn RemoteStore,
    account_id: u64,
    remote_src: &str,
    local_dest: &Path,
    working_dir: &Path,
    query: &QueryValues,
    options: &DownloadOptions,
) -> Result<DownloadReport, TransferError> {
    if !paths::is_allowed_extension(remote_src) {
        return Err(TransferError::ExtensionNotAllowed {
            path: remote_src.to_owned(),
        });
    }
    let name = paths::remote_basename(remote_src);
    let verbatim = local_dest != working_dir && paths::is_file(&local_dest.to_string_lossy());
    let dest = if verbatim {
        local_dest.to_path_buf()
    } else {
        local_dest.join(name)
    };

    let mut report = DownloadReport::new(dest.clone());
    if dest.exists() && !options.overwrite {
        trace_download!("{} exists, skipping", dest.display());
        report.skipped.push(dest);
        return Ok(report);
    }
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_path(parent, "create directory")?;
    }

    let node = store
        .download_stream(account_id, remote_src, &dest, query)
        .await?;
    let mut written = dest;
    let disposition = node.name();
    if !verbatim && !disposition.is_empty() && disposition != name {
        let renamed = written.with_file_name(disposition);
        tokio::fs::rename(&written, &renamed)
            .await
            .with_path(&written, "rename")?;
        written = renamed;
    }
    apply_timestamps(&written, node.created_at(), node.updated_at())?;
    trace_download!("wrote {}", written.display());
    report.destination.clone_from(&written);
    report.written.push(written);
    Ok(report)
}

async fn download_folder(
    store: Arc<dyn RemoteStore>,
    account_id: u64,
    remote_src: &str,
    local_dest: &Path,
    working_dir: &Path,
    query: QueryValues,
    options: &DownloadOptions,
) -> Result<DownloadReport, TransferError> {
    let tree = if paths::is_default_content(remote_src) {
        store
            .download_default_tree(account_id, remote_src, &query)
            .await?
    } else {
        store.download_tree(account_id, remote_src, &query).await?
    };

    let dest_root = if local_dest == working_dir && !tree.name().is_empty() {
        working_dir.join(tree.name())
    } else {
        local_dest.to_path_buf()
    };
    let mut report = DownloadReport::new(dest_root.clone());

    let queue = TransferQueue::with_concurrency(options.concurrency);
    let aborted = Arc::new(AtomicBool::new(false));
    let mut completions: Vec<(String, Completion<Result<Materialized, TransferError>>)> =
        Vec::new();
    let root_path = tree.path().to_owned();

    let flow = traverse(&tree, &mut |node| {
        if aborted.load(Ordering::SeqCst) {
            return ControlFlow::Break(());
        }
        let remote_path = node.path().to_owned();
        let target = match local_target(&dest_root, &root_path, &remote_path) {
            Ok(target) => target,
            Err(error) => {
                completions.push((remote_path, queue.submit(async move { Err(error) })));
                return ControlFlow::Continue(());
            }
        };
        let job = MaterializeJob {
            store: Arc::clone(&store),
            account_id,
            query: query.clone(),
            remote_path: remote_path.clone(),
            folder: node.is_folder(),
            target,
            overwrite: options.overwrite,
            aborted: Arc::clone(&aborted),
        };
        completions.push((remote_path, queue.submit(job.run())));
        ControlFlow::Continue(())
    });
    if flow.is_break() {
        trace_download!("stopped walking {remote_src} after a fatal failure");
    }
    queue.on_idle().await;

    for (remote_path, completion) in completions {
        match completion.await {
            Some(Ok(Materialized::Directory(path))) => report.directories.push(path),
            Some(Ok(Materialized::Written(path))) => report.written.push(path),
            Some(Ok(Materialized::Skipped(path))) => report.skipped.push(path),
            Some(Err(error)) => {
                tracing::warn!(target: "hsync::download", "failed to download {remote_path}: {error}");
                report.failures.push(DownloadFailure { remote_path, error });
            }
            None => report.failures.push(DownloadFailure {
                error: TransferError::Interrupted(remote_path.clone()),
                remote_path,
            }),
        }
    }
    if !report.failures.is_empty() {
        report.status = DownloadStatus::Incomplete;
    }
    trace_download!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        failed = report.failures.len(),
        "downloaded {remote_src} to {}",
        report.destination.display()
    );
    Ok(report)
}

/// Visits `node` and its descendants in pre-order.
///
/// Returning [`ControlFlow::Break`] from `visit` ends the traversal: no
/// deeper or later node is visited.
pub fn traverse<F>(node: &RemoteNode, visit: &mut F) -> ControlFlow<()>
where
    F: FnMut(&RemoteNode) -> ControlFlow<()>,
{
    visit(node)?;
    for child in node.children() {
        traverse(child, visit)?;
    }
    ControlFlow::Continue(())
}

fn local_target(dest_root: &Path, root_path: &str, node_path: &str) -> Result<PathBuf, TransferError> {
    let relative = node_path
        .strip_prefix(root_path)
        .unwrap_or(node_path)
        .trim_start_matches('/');
    let relative = Path::new(relative);
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return Err(TransferError::UnsafePath {
            remote_path: node_path.to_owned(),
            dest: dest_root.to_path_buf(),
        });
    }
    Ok(dest_root.join(relative))
}

struct MaterializeJob {
    store: Arc<dyn RemoteStore>,
    account_id: u64,
    query: QueryValues,
    remote_path: String,
    folder: bool,
    target: PathBuf,
    overwrite: bool,
    aborted: Arc<AtomicBool>,
}

impl MaterializeJob {
    async fn run(self) -> Result<Materialized, TransferError> {
        if self.folder {
            tokio::fs::create_dir_all(&self.target)
                .await
                .with_path(&self.target, "create directory")?;
            return Ok(Materialized::Directory(self.target));
        }
        if self.aborted.load(Ordering::SeqCst) {
            trace_download!("not starting {} after a fatal failure", self.remote_path);
            return Err(TransferError::Aborted(self.remote_path));
        }
        if !paths::is_allowed_extension(&self.remote_path) {
            return Err(TransferError::ExtensionNotAllowed {
                path: self.remote_path,
            });
        }
        if self.target.exists() && !self.overwrite {
            return Ok(Materialized::Skipped(self.target));
        }
        if let Some(parent) = self.target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_path(parent, "create directory")?;
        }
        let node = self
            .store
            .download_stream(self.account_id, &self.remote_path, &self.target, &self.query)
            .await
            .map_err(|error| {
                if error.is_fatal() {
                    self.aborted.store(true, Ordering::SeqCst);
                }
                TransferError::from(error)
            })?;
        apply_timestamps(&self.target, node.created_at(), node.updated_at())?;
        trace_download!("wrote {}", self.target.display());
        Ok(Materialized::Written(self.target))
    }
}

/// Sets access and modification times from epoch milliseconds; zero means
/// now.
pub(crate) fn apply_timestamps(
    path: &Path,
    created_at: i64,
    updated_at: i64,
) -> Result<(), FileSystemError> {
    let now = FileTime::from_system_time(SystemTime::now());
    let to_file_time = |millis: i64| {
        if millis == 0 {
            now
        } else {
            let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
            FileTime::from_unix_time(millis.div_euclid(1000), nanos)
        }
    };
    filetime::set_file_times(path, to_file_time(created_at), to_file_time(updated_at))
        .with_path(path, "set times on")
}
