use std::fmt;
use std::path::{Path, PathBuf};

/// Final state of one scheduled file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The remote call succeeded.
    Success,
    /// Every attempt failed.
    Failure,
    /// The file was left out before any remote call (rejected conversion,
    /// superseded document, or an aborted batch).
    Skipped,
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Skipped => "skipped",
        })
    }
}

/// Outcome record for one file of an upload batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferResult {
    path: PathBuf,
    remote_path: String,
    outcome: TransferOutcome,
    error: Option<String>,
    attempts: u32,
}

impl TransferResult {
    pub(crate) fn new(path: PathBuf, remote_path: String) -> Self {
        Self {
            path,
            remote_path,
            outcome: TransferOutcome::Skipped,
            error: None,
            attempts: 0,
        }
    }

    pub(crate) fn skipped(path: PathBuf, remote_path: String, reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::new(path, remote_path)
        }
    }

    pub(crate) fn record_attempt(&mut self, error: Option<String>) {
        self.attempts += 1;
        self.outcome = if error.is_some() {
            TransferOutcome::Failure
        } else {
            TransferOutcome::Success
        };
        self.error = error;
    }

    /// Local file the user asked to upload.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remote destination.
    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    /// Final state.
    pub fn outcome(&self) -> TransferOutcome {
        self.outcome
    }

    /// Last error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Remote calls made for this file (zero, one or two).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns `true` for [`TransferOutcome::Success`].
    pub fn is_success(&self) -> bool {
        self.outcome == TransferOutcome::Success
    }
}
