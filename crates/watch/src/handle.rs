use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use url::Url;

use crate::action::{ActivityEntry, WatchFailure};
use crate::error::WatchError;
use crate::event::WatchEvent;

/// Lifecycle of a watch session. States only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WatchState {
    /// Rules and observer are being set up.
    Initializing,
    /// The whole tree is being uploaded.
    InitialSync,
    /// Events are being turned into remote actions.
    Watching,
    /// The session ended.
    Stopped,
}

/// Something a session reports to its subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchNotice {
    /// One debounced activity block was written.
    Activity(Vec<ActivityEntry>),
    /// The theme preview is worth refreshing.
    Preview(Url),
    /// An upload or delete failed after its retry.
    Failed(WatchFailure),
    /// The activity log could not be written.
    LogFailed(String),
}

/// Control handle of a running watch session.
///
/// Dropping the handle stops the session.
#[derive(Debug)]
pub struct WatchHandle {
    pub(crate) stop: watch::Sender<bool>,
    pub(crate) state: watch::Receiver<WatchState>,
    pub(crate) task: JoinHandle<Result<(), WatchError>>,
    pub(crate) notices: broadcast::Sender<WatchNotice>,
    pub(crate) failures: Arc<Mutex<Vec<WatchFailure>>>,
    pub(crate) events: tokio::sync::mpsc::UnboundedSender<WatchEvent>,
}

impl WatchHandle {
    /// Current state.
    pub fn state(&self) -> WatchState {
        *self.state.borrow()
    }

    /// Waits until the session reaches `state` or a later one and returns
    /// the state observed.
    pub async fn wait_for(&self, state: WatchState) -> WatchState {
        let mut receiver = self.state.clone();
        receiver
            .wait_for(|current| *current >= state)
            .await
            .map_or(WatchState::Stopped, |current| *current)
    }

    /// Stops observing. Queued actions finish; no new action starts.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Waits for the session to end.
    pub async fn join(self) -> Result<(), WatchError> {
        self.task
            .await
            .map_err(|error| WatchError::Task(error.to_string()))?
    }

    /// Stops the session and waits for it to end.
    pub async fn shutdown(self) -> Result<(), WatchError> {
        self.stop();
        self.join().await
    }

    /// Receives notices sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<WatchNotice> {
        self.notices.subscribe()
    }

    /// Failures recorded so far.
    pub fn failures(&self) -> Vec<WatchFailure> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Feeds an event as if the observer had reported it.
    ///
    /// Returns `false` once the session no longer accepts events.
    pub fn dispatch(&self, event: WatchEvent) -> bool {
        self.events.send(event).is_ok()
    }
}
