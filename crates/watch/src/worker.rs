//! Maps watch events to queued remote actions.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use fields::{OUTPUT_FILE_NAME, is_convertible};
use filters::IgnoreRuleSet;
use logging::{ActivityLog, trace_delete, trace_upload, trace_watch};
use remote::{QueryValues, RemoteStore};
use tokio::sync::{broadcast, mpsc};
use transfer::{Completion, TransferQueue};

use crate::action::{ActionOutcome, WatchFailure};
use crate::event::{WatchEvent, WatchEventKind};
use crate::handle::WatchNotice;
use crate::options::WatchOptions;

/// State shared by the session loop and every queued action.
pub(crate) struct Shared {
    pub(crate) store: Arc<dyn RemoteStore>,
    pub(crate) account_id: u64,
    pub(crate) local_root: PathBuf,
    pub(crate) remote_root: String,
    pub(crate) query: QueryValues,
    pub(crate) options: WatchOptions,
    pub(crate) ignore: Arc<IgnoreRuleSet>,
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) activity_log: Option<ActivityLog>,
    pub(crate) failures: Arc<Mutex<Vec<WatchFailure>>>,
    pub(crate) notices: broadcast::Sender<WatchNotice>,
}

impl Shared {
    fn remote_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.local_root).unwrap_or(path);
        paths::remote_join(&self.remote_root, &paths::to_remote_path(relative))
    }

    fn is_convertible(&self, path: &Path) -> bool {
        is_convertible(&self.local_root, path, &self.options.convert)
    }

    fn record_failure(&self, failure: WatchFailure) {
        tracing::error!(target: "hsync::watch", "{failure}");
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure.clone());
        let _ = self.notices.send(WatchNotice::Failed(failure));
    }
}

/// Event path and outcome of a finished action.
pub(crate) type Finished = (PathBuf, ActionOutcome);

/// Queues the single action `event` maps to. The action reports its
/// outcome on `finished` before its completion resolves.
///
/// Returns `None` when the event is skipped without touching the remote
/// side.
pub(crate) fn handle_event(
    shared: &Arc<Shared>,
    queue: &TransferQueue,
    finished: &mpsc::UnboundedSender<Finished>,
    event: WatchEvent,
) -> Option<Completion<ActionOutcome>> {
    let WatchEvent { kind, path } = event;
    if !path.starts_with(&shared.local_root) {
        trace_watch!(path = %path.display(), "event outside the watched root");
        return None;
    }
    let in_project = shared.options.in_project;
    match kind {
        WatchEventKind::Add | WatchEventKind::Change => {
            let convertible = shared.is_convertible(&path);
            if shared.ignore.should_ignore(&path, in_project) {
                trace_watch!(path = %path.display(), "skipping ignored file");
                return None;
            }
            if !convertible && !paths::is_allowed_extension(&path.to_string_lossy()) {
                trace_watch!(path = %path.display(), "skipping file with disallowed extension");
                return None;
            }
            let job = upload(Arc::clone(shared), path.clone());
            Some(queue.submit(report(finished.clone(), path, job)))
        }
        WatchEventKind::Unlink | WatchEventKind::UnlinkDir => {
            if !shared.options.remove || shared.is_convertible(&path) {
                return None;
            }
            let ignored = if kind == WatchEventKind::UnlinkDir {
                shared.ignore.should_ignore_dir(&path, in_project)
            } else {
                shared.ignore.should_ignore(&path, in_project)
            };
            if ignored {
                trace_watch!(path = %path.display(), "skipping ignored removal");
                return None;
            }
            let job = delete(Arc::clone(shared), path.clone());
            Some(queue.submit(report(finished.clone(), path, job)))
        }
    }
}

async fn report(
    finished: mpsc::UnboundedSender<Finished>,
    path: PathBuf,
    job: impl Future<Output = ActionOutcome>,
) -> ActionOutcome {
    let outcome = job.await;
    let _ = finished.send((path, outcome.clone()));
    outcome
}

async fn upload(shared: Arc<Shared>, path: PathBuf) -> ActionOutcome {
    let mut remote = shared.remote_for(&path);
    let mut local = path.clone();

    if shared.is_convertible(&path) {
        let Some(output_dir) = &shared.output_dir else {
            return ActionOutcome::Skipped {
                path,
                reason: "conversion workspace unavailable".into(),
            };
        };
        let job = shared
            .options
            .converter
            .convert(
                &shared.local_root,
                &path,
                output_dir,
                &shared.options.convert.field_options,
            )
            .await;
        let Some(output) = job.output_path() else {
            return ActionOutcome::Skipped {
                reason: job.rejection_reason().unwrap_or("conversion rejected").to_owned(),
                path,
            };
        };
        if shared.options.convert.save_output
            && let Err(error) = job.save_output()
        {
            tracing::warn!(target: "hsync::watch", "{error}");
        }
        local = output.to_path_buf();
        remote = paths::remote_sibling(&remote, OUTPUT_FILE_NAME);
    }

    let store = shared.store.as_ref();
    let first = store
        .upload_file(shared.account_id, &local, &remote, &shared.query)
        .await;
    let Err(first) = first else {
        trace_upload!("uploaded {} to {remote}", local.display());
        return ActionOutcome::Uploaded { local, remote };
    };
    trace_upload!("upload of {remote} failed ({first}), retrying with {}", path.display());

    match store
        .upload_file(shared.account_id, &path, &remote, &shared.query)
        .await
    {
        Ok(()) => {
            trace_upload!("uploaded {} to {remote}", path.display());
            ActionOutcome::Uploaded {
                local: path,
                remote,
            }
        }
        Err(error) => {
            let failure = WatchFailure {
                path,
                remote_path: remote,
                message: error.to_string(),
            };
            shared.record_failure(failure.clone());
            ActionOutcome::Failed(failure)
        }
    }
}

async fn delete(shared: Arc<Shared>, path: PathBuf) -> ActionOutcome {
    let remote = shared.remote_for(&path);
    match shared.store.delete_remote(shared.account_id, &remote).await {
        Ok(()) => {
            trace_delete!("deleted {remote}");
            ActionOutcome::Deleted { remote }
        }
        Err(error) => {
            let failure = WatchFailure {
                path,
                remote_path: remote,
                message: error.to_string(),
            };
            shared.record_failure(failure.clone());
            ActionOutcome::Failed(failure)
        }
    }
}
