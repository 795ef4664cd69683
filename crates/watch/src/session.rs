//! Watch session lifecycle.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use fields::ConversionWorkspace;
use filters::IgnoreRuleSet;
use logging::{ActivityLog, trace_watch};
use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use remote::{FileSystemError, QueryValues, RemoteStore};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use transfer::{Completion, TransferQueue, TransferResult, collect_local_files, upload_tree};

use crate::action::ActionOutcome;
use crate::debounce::{Debouncer, sleep_until_due};
use crate::error::WatchError;
use crate::event::WatchEvent;
use crate::handle::{WatchHandle, WatchNotice, WatchState};
use crate::options::WatchOptions;
use crate::preview::{find_theme_name, theme_preview_url};
use crate::worker::{Finished, Shared, handle_event};

/// Called once with the initial upload's results.
pub type InitialUploadCallback = Box<dyn FnOnce(&[TransferResult]) + Send>;

const NOTICE_CAPACITY: usize = 256;

/// Starts watching `local_root` and mirroring it to `remote_root`.
///
/// Must be called inside a tokio runtime.
pub fn watch(
    store: Arc<dyn RemoteStore>,
    account_id: u64,
    local_root: &Path,
    remote_root: &str,
    options: WatchOptions,
    on_initial_upload_done: Option<InitialUploadCallback>,
) -> Result<WatchHandle, WatchError> {
    Watcher::new(store, account_id, local_root, remote_root, options).start(on_initial_upload_done)
}

/// Builder for a watch session.
pub struct Watcher {
    store: Arc<dyn RemoteStore>,
    account_id: u64,
    local_root: PathBuf,
    remote_root: String,
    options: WatchOptions,
}

impl Watcher {
    /// Describes a session over `local_root`.
    pub fn new(
        store: Arc<dyn RemoteStore>,
        account_id: u64,
        local_root: impl Into<PathBuf>,
        remote_root: impl Into<String>,
        options: WatchOptions,
    ) -> Self {
        Self {
            store,
            account_id,
            local_root: local_root.into(),
            remote_root: remote_root.into(),
            options,
        }
    }

    /// Starts the session with a filesystem observer.
    pub fn start(
        self,
        on_initial_upload_done: Option<InitialUploadCallback>,
    ) -> Result<WatchHandle, WatchError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let observer_sender = sender.clone();
        let mut observer =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                match result {
                    Ok(event) => {
                        for event in WatchEvent::from_notify(&event) {
                            let _ = observer_sender.send(event);
                        }
                    }
                    Err(error) => tracing::warn!(target: "hsync::watch", "observer error: {error}"),
                }
            })?;
        observer.watch(&self.local_root, RecursiveMode::Recursive)?;
        self.spawn(sender, receiver, Some(observer), on_initial_upload_done)
    }

    /// Starts the session without a filesystem observer. Events arrive only
    /// through [`WatchHandle::dispatch`].
    pub fn start_without_observer(
        self,
        on_initial_upload_done: Option<InitialUploadCallback>,
    ) -> Result<WatchHandle, WatchError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.spawn(sender, receiver, None, on_initial_upload_done)
    }

    fn spawn(
        self,
        sender: mpsc::UnboundedSender<WatchEvent>,
        receiver: mpsc::UnboundedReceiver<WatchEvent>,
        observer: Option<RecommendedWatcher>,
        on_initial_upload_done: Option<InitialUploadCallback>,
    ) -> Result<WatchHandle, WatchError> {
        let (state_sender, state) = watch::channel(WatchState::Initializing);
        let (stop, stop_receiver) = watch::channel(false);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let failures = Arc::new(Mutex::new(Vec::new()));

        let ignore = self
            .options
            .ignore
            .clone()
            .unwrap_or_else(|| Arc::new(IgnoreRuleSet::with_start_dir(&self.local_root)));
        let workspace = if self.options.convert.enabled {
            let workspace = ConversionWorkspace::create()?;
            ignore.add_runtime_pattern(workspace.path());
            Some(workspace)
        } else {
            None
        };
        let activity_log = self.options.activity_log.clone().map(|path| {
            ignore.add_runtime_pattern(&path);
            ActivityLog::new(path)
        });

        let shared = Arc::new(Shared {
            store: self.store,
            account_id: self.account_id,
            local_root: self.local_root,
            remote_root: self.remote_root,
            query: QueryValues::new(self.options.mode, self.options.environment),
            output_dir: workspace.as_ref().map(|workspace| workspace.path().to_path_buf()),
            options: self.options,
            ignore,
            activity_log,
            failures: Arc::clone(&failures),
            notices: notices.clone(),
        });

        let session = Session {
            shared,
            state: state_sender,
            stop: stop_receiver,
            events: receiver,
            observer,
            workspace,
        };
        let task = tokio::spawn(session.run(on_initial_upload_done));
        Ok(WatchHandle {
            stop,
            state,
            task,
            notices,
            failures,
            events: sender,
        })
    }
}

struct Session {
    shared: Arc<Shared>,
    state: watch::Sender<WatchState>,
    stop: watch::Receiver<bool>,
    events: mpsc::UnboundedReceiver<WatchEvent>,
    observer: Option<RecommendedWatcher>,
    workspace: Option<ConversionWorkspace>,
}

impl Session {
    async fn run(mut self, on_initial_upload_done: Option<InitialUploadCallback>) -> Result<(), WatchError> {
        let result = self.initial_sync(on_initial_upload_done).await;
        if result.is_ok() && !*self.stop.borrow() {
            self.state.send_replace(WatchState::Watching);
            self.watch_loop().await;
        }

        self.observer.take();
        if let Some(workspace) = self.workspace.take()
            && let Err(error) = workspace.cleanup()
        {
            tracing::warn!(target: "hsync::watch", "{error}");
        }
        self.state.send_replace(WatchState::Stopped);
        trace_watch!("stopped watching {}", self.shared.local_root.display());
        result
    }

    async fn initial_sync(
        &mut self,
        on_initial_upload_done: Option<InitialUploadCallback>,
    ) -> Result<(), WatchError> {
        let shared = Arc::clone(&self.shared);
        if shared.options.disable_initial {
            return Ok(());
        }
        self.state.send_replace(WatchState::InitialSync);
        let files = collect_local_files(
            &shared.local_root,
            Some(&shared.ignore),
            shared.options.in_project,
        )?;
        let results = upload_tree(
            Arc::clone(&shared.store),
            shared.account_id,
            &shared.local_root,
            &shared.remote_root,
            &shared.options.upload_options(Arc::clone(&shared.ignore)),
            &files,
            shared.options.mode,
        )
        .await?;
        tracing::info!(
            target: "hsync::watch",
            "uploaded {} of {} files from {}",
            results.iter().filter(|result| result.is_success()).count(),
            results.len(),
            shared.local_root.display()
        );
        if let Some(callback) = on_initial_upload_done {
            callback(&results);
        }
        Ok(())
    }

    async fn watch_loop(&mut self) {
        let shared = Arc::clone(&self.shared);
        let queue = TransferQueue::with_concurrency(shared.options.concurrency);
        let mut activity: Debouncer<Completion<ActionOutcome>> =
            Debouncer::new(shared.options.activity_quiet);
        let mut preview: Debouncer<PathBuf> = Debouncer::new(shared.options.preview_quiet);
        let (finished_sender, mut finished) = mpsc::unbounded_channel::<Finished>();
        let mut writers = Vec::new();
        tracing::info!(target: "hsync::watch", "watching {}", shared.local_root.display());

        loop {
            tokio::select! {
                biased;
                changed = self.stop.changed() => {
                    if changed.is_err() || *self.stop.borrow() {
                        break;
                    }
                }
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    trace_watch!(kind = ?event.kind, path = %event.path.display(), "event");
                    if let Some(completion) = handle_event(&shared, &queue, &finished_sender, event) {
                        activity.push(completion);
                    }
                }
                Some((path, outcome)) = finished.recv() => {
                    if outcome.is_success() {
                        preview.push(path);
                    }
                }
                () = sleep_until_due(activity.deadline()) => {
                    writers.push(tokio::spawn(write_activity(Arc::clone(&shared), activity.take())));
                }
                () = sleep_until_due(preview.deadline()) => {
                    if queue.is_idle() {
                        announce_preview(&shared, &preview.take());
                    } else {
                        trace_watch!(pending = queue.pending(), "preview notice postponed");
                        preview.postpone_at(Instant::now());
                    }
                }
            }
        }

        self.observer.take();
        queue.close();
        queue.on_idle().await;
        if !activity.is_empty() {
            writers.push(tokio::spawn(write_activity(Arc::clone(&shared), activity.take())));
        }
        for writer in writers {
            if let Err(error) = writer.await {
                tracing::warn!(target: "hsync::watch", "activity writer failed: {error}");
            }
        }
    }
}

async fn write_activity(shared: Arc<Shared>, batch: Vec<Completion<ActionOutcome>>) {
    let mut entries = Vec::with_capacity(batch.len());
    for completion in batch {
        if let Some(entry) = completion.await.as_ref().and_then(ActionOutcome::activity_entry) {
            entries.push(entry);
        }
    }
    if entries.is_empty() {
        return;
    }

    let now = Utc::now();
    let block: String = entries
        .iter()
        .map(|entry| ActivityLog::format_entry(now, entry.action.label(), &entry.remote_path))
        .collect();
    if let Some(log) = &shared.activity_log
        && let Err(error) = log.append(&block)
    {
        let error = FileSystemError::from(error);
        tracing::error!(target: "hsync::watch", "{error}");
        let _ = shared.notices.send(WatchNotice::LogFailed(error.to_string()));
    }
    trace_watch!(entries = entries.len(), "recorded activity");
    let _ = shared.notices.send(WatchNotice::Activity(entries));
}

fn announce_preview(shared: &Shared, paths: &[PathBuf]) {
    let Some(theme) = paths
        .iter()
        .rev()
        .find_map(|path| find_theme_name(&shared.local_root, path))
    else {
        return;
    };
    match theme_preview_url(shared.account_id, shared.options.environment, &theme) {
        Ok(url) => {
            tracing::info!(target: "hsync::watch", "preview your changes at {url}");
            let _ = shared.notices.send(WatchNotice::Preview(url));
        }
        Err(error) => tracing::warn!(target: "hsync::watch", "invalid preview address: {error}"),
    }
}
