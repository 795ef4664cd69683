use std::fmt;
use std::path::PathBuf;

/// Remote change recorded in the activity log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityAction {
    /// A file was uploaded.
    Uploaded,
    /// A remote path was deleted.
    Deleted,
}

impl ActivityAction {
    /// Label written to the activity log.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Uploaded => "Uploaded",
            Self::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of an activity block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityEntry {
    /// What happened.
    pub action: ActivityAction,
    /// Remote path affected.
    pub remote_path: String,
}

/// An upload or delete that failed for good.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchFailure {
    /// Local path of the event.
    pub path: PathBuf,
    /// Remote path the action targeted.
    pub remote_path: String,
    /// Last error message.
    pub message: String,
}

impl fmt::Display for WatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {}",
            self.path.display(),
            self.remote_path,
            self.message
        )
    }
}

/// Result of one queued watch action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The file (or its converted document) was uploaded.
    Uploaded {
        /// File that was sent.
        local: PathBuf,
        /// Remote destination.
        remote: String,
    },
    /// The remote path was deleted.
    Deleted {
        /// Remote path.
        remote: String,
    },
    /// Nothing was sent (for example a rejected conversion).
    Skipped {
        /// Local path of the event.
        path: PathBuf,
        /// Why.
        reason: String,
    },
    /// The action failed after its retry.
    Failed(WatchFailure),
}

impl ActionOutcome {
    /// Returns `true` for uploads and deletes that reached the remote side.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Uploaded { .. } | Self::Deleted { .. })
    }

    /// Activity log entry for successful actions.
    pub fn activity_entry(&self) -> Option<ActivityEntry> {
        match self {
            Self::Uploaded { remote, .. } => Some(ActivityEntry {
                action: ActivityAction::Uploaded,
                remote_path: remote.clone(),
            }),
            Self::Deleted { remote } => Some(ActivityEntry {
                action: ActivityAction::Deleted,
                remote_path: remote.clone(),
            }),
            Self::Skipped { .. } | Self::Failed(_) => None,
        }
    }
}
