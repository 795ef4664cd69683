//! Categorized batch upload with one retry pass.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fields::{
    ConversionJob, ConversionWorkspace, ConvertOptions, FieldsConverter, OUTPUT_FILE_NAME,
    is_convertible,
};
use filters::IgnoreRuleSet;
use logging::trace_upload;
use remote::{Environment, PublishMode, QueryValues, RemoteError, RemoteStore};

use crate::category::{FileCategory, partition};
use crate::error::TransferError;
use crate::outcome::TransferResult;
use crate::queue::{Completion, DEFAULT_CONCURRENCY, TransferQueue};

/// Settings for [`upload_tree`].
#[derive(Clone, Debug)]
pub struct UploadOptions {
    /// Fields conversion settings.
    pub convert: ConvertOptions,
    /// Converter used for convertible sources.
    pub converter: FieldsConverter,
    /// Target environment.
    pub environment: Environment,
    /// Rules that drop files before partitioning.
    pub ignore: Option<Arc<IgnoreRuleSet>>,
    /// Whether the upload runs inside a project (affects default rules).
    pub in_project: bool,
    /// Queue concurrency ceiling.
    pub concurrency: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            convert: ConvertOptions::default(),
            converter: FieldsConverter::default(),
            environment: Environment::default(),
            ignore: None,
            in_project: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl UploadOptions {
    /// Sets the conversion settings.
    pub fn with_convert(mut self, convert: ConvertOptions) -> Self {
        self.convert = convert;
        self
    }

    /// Sets the converter.
    pub fn with_converter(mut self, converter: FieldsConverter) -> Self {
        self.converter = converter;
        self
    }

    /// Sets the target environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Filters files through `ignore`.
    pub fn with_ignore(mut self, ignore: Arc<IgnoreRuleSet>) -> Self {
        self.ignore = Some(ignore);
        self
    }

    /// Marks the upload as running inside a project.
    pub fn with_in_project(mut self, in_project: bool) -> Self {
        self.in_project = in_project;
        self
    }

    /// Overrides the concurrency ceiling.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

#[derive(Debug)]
struct UploadTask {
    result: usize,
    local: PathBuf,
    remote: String,
}

enum Attempt {
    NotStarted,
    Finished(Result<(), RemoteError>),
}

/// Uploads `file_paths` below `local_root` to `remote_root`.
///
/// Files are partitioned by [`FileCategory`] and submitted category by
/// category to one bounded queue. Convertible `fields.js` sources are
/// converted first and their documents uploaded as `fields.json` in the
/// JSON category. Retryable failures are attempted once more after the first
/// pass drains. A fatal failure stops new uploads from starting and is
/// returned once in-flight uploads finish. The conversion workspace is
/// removed on every path out.
///
/// The returned list has one entry per non-ignored file, in submission
/// order.
pub async fn upload_tree(
    store: Arc<dyn RemoteStore>,
    account_id: u64,
    local_root: &Path,
    remote_root: &str,
    options: &UploadOptions,
    file_paths: &[PathBuf],
    mode: PublishMode,
) -> Result<Vec<TransferResult>, TransferError> {
    let files: Vec<&PathBuf> = file_paths
        .iter()
        .filter(|path| {
            let ignored = options
                .ignore
                .as_ref()
                .is_some_and(|rules| rules.should_ignore(path, options.in_project));
            if ignored {
                trace_upload!(path = %path.display(), "skipping ignored file");
            }
            !ignored
        })
        .collect();

    let convertible: Vec<&PathBuf> = files
        .iter()
        .copied()
        .filter(|path| is_convertible(local_root, path, &options.convert))
        .collect();
    let workspace = if convertible.is_empty() {
        None
    } else {
        Some(ConversionWorkspace::create()?)
    };

    let mut jobs = Vec::with_capacity(convertible.len());
    if let Some(workspace) = &workspace {
        for source in &convertible {
            jobs.push(
                options
                    .converter
                    .convert(
                        local_root,
                        source,
                        workspace.path(),
                        &options.convert.field_options,
                    )
                    .await,
            );
        }
    }

    let outcome = run_batch(
        store,
        account_id,
        local_root,
        remote_root,
        options,
        &files,
        &jobs,
        QueryValues::new(mode, options.environment),
    )
    .await;

    if options.convert.save_output {
        for job in &jobs {
            match job.save_output() {
                Ok(Some(saved)) => trace_upload!("saved converted output to {}", saved.display()),
                Ok(None) => {}
                Err(error) => tracing::warn!(target: "hsync::upload", "{error}"),
            }
        }
    }
    if let Some(workspace) = workspace
        && let Err(error) = workspace.cleanup()
    {
        tracing::warn!(target: "hsync::upload", "{error}");
    }
    outcome
}

#[allow(clippy::too_many_arguments)]
async fn run_batch(
    store: Arc<dyn RemoteStore>,
    account_id: u64,
    local_root: &Path,
    remote_root: &str,
    options: &UploadOptions,
    files: &[&PathBuf],
    jobs: &[ConversionJob],
    query: QueryValues,
) -> Result<Vec<TransferResult>, TransferError> {
    let converted_dirs: HashSet<&Path> = jobs
        .iter()
        .filter_map(|job| job.source_path().parent())
        .collect();
    let remote_for = |path: &Path| {
        let relative = path.strip_prefix(local_root).unwrap_or(path);
        paths::remote_join(remote_root, &paths::to_remote_path(relative))
    };

    let mut results = Vec::with_capacity(files.len());
    let mut tasks: Vec<UploadTask> = Vec::with_capacity(files.len());
    let partitioned = partition(local_root, files);
    for category in FileCategory::ORDER {
        let queued = tasks.len();
        for path in partitioned.files(category) {
            if is_convertible(local_root, path, &options.convert) {
                continue;
            }
            let remote = remote_for(path);
            let superseded = path
                .file_name()
                .is_some_and(|name| name == OUTPUT_FILE_NAME)
                && path
                    .parent()
                    .is_some_and(|dir| converted_dirs.contains(dir));
            if superseded {
                results.push(TransferResult::skipped(
                    path.clone(),
                    remote,
                    "superseded by converted fields document",
                ));
                continue;
            }
            tasks.push(UploadTask {
                result: results.len(),
                local: path.clone(),
                remote: remote.clone(),
            });
            results.push(TransferResult::new(path.clone(), remote));
        }
        if category == FileCategory::Json {
            for job in jobs {
                let remote = paths::remote_sibling(&remote_for(job.source_path()), OUTPUT_FILE_NAME);
                match job.output_path() {
                    Some(output) => {
                        tasks.push(UploadTask {
                            result: results.len(),
                            local: output.to_path_buf(),
                            remote: remote.clone(),
                        });
                        results.push(TransferResult::new(job.source_path().to_path_buf(), remote));
                    }
                    None => results.push(TransferResult::skipped(
                        job.source_path().to_path_buf(),
                        remote,
                        job.rejection_reason().unwrap_or("conversion rejected"),
                    )),
                }
            }
        }
        if tasks.len() > queued {
            trace_upload!(
                category = category.as_str(),
                files = tasks.len() - queued,
                "queued category"
            );
        }
    }

    let queue = TransferQueue::with_concurrency(options.concurrency);
    let aborted = Arc::new(AtomicBool::new(false));
    let mut pending: Vec<&UploadTask> = tasks.iter().collect();

    for pass in 1..=2 {
        if pending.is_empty() {
            break;
        }
        if pass == 2 {
            trace_upload!("retrying {} failed uploads", pending.len());
        }
        let completions: Vec<(&UploadTask, Completion<Attempt>)> = pending
            .iter()
            .map(|task| {
                let store = Arc::clone(&store);
                let aborted = Arc::clone(&aborted);
                let query = query.clone();
                let local = task.local.clone();
                let remote = task.remote.clone();
                let completion = queue.submit(async move {
                    if aborted.load(Ordering::SeqCst) {
                        return Attempt::NotStarted;
                    }
                    let result = store.upload_file(account_id, &local, &remote, &query).await;
                    if result.as_ref().is_err_and(RemoteError::is_fatal) {
                        aborted.store(true, Ordering::SeqCst);
                    }
                    Attempt::Finished(result)
                });
                (*task, completion)
            })
            .collect();
        queue.on_idle().await;

        let mut failed = Vec::new();
        let mut fatal = None;
        for (task, completion) in completions {
            let result = &mut results[task.result];
            match completion.await {
                Some(Attempt::NotStarted) => {
                    *result = TransferResult::skipped(
                        result.path().to_path_buf(),
                        task.remote.clone(),
                        "batch aborted",
                    );
                }
                Some(Attempt::Finished(Ok(()))) => {
                    trace_upload!("uploaded {} to {}", task.local.display(), task.remote);
                    result.record_attempt(None);
                }
                Some(Attempt::Finished(Err(error))) => {
                    tracing::warn!(target: "hsync::upload", "upload of {} failed: {error}", task.remote);
                    result.record_attempt(Some(error.to_string()));
                    match TransferError::from(error) {
                        TransferError::Fatal(error) => {
                            fatal.get_or_insert(error);
                        }
                        _ => failed.push(task),
                    }
                }
                None => {
                    let error = TransferError::Interrupted(task.remote.clone());
                    result.record_attempt(Some(error.to_string()));
                    failed.push(task);
                }
            }
        }
        if let Some(error) = fatal {
            return Err(TransferError::Fatal(error));
        }
        pending = failed;
    }

    Ok(results)
}
