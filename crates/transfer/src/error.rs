//! Error taxonomy for transfer operations.
//!
//! Only [`TransferError::Fatal`] and [`TransferError::Initialization`] stop a
//! batch. Everything else is captured into per-file outcome records.

use std::path::PathBuf;

use fields::ConversionError;
use remote::{FileSystemError, RemoteError};
use thiserror::Error;

/// Errors produced by uploads and downloads.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Authentication or authorization failure. Aborts the batch.
    #[error("fatal: {0}")]
    Fatal(#[source] RemoteError),

    /// Validation or transient failure. Retried once, then reported.
    #[error(transparent)]
    Retryable(RemoteError),

    /// Local file operation failure.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// The batch could not be set up.
    #[error("failed to prepare transfer: {0}")]
    Initialization(#[from] ConversionError),

    /// The file's extension is not on the allow-list.
    #[error("extension of {path} is not allowed")]
    ExtensionNotAllowed {
        /// Offending path.
        path: String,
    },

    /// A remote node resolved outside the destination directory.
    #[error("refusing to write {remote_path} outside {}", dest.display())]
    UnsafePath {
        /// Remote node path.
        remote_path: String,
        /// Destination directory.
        dest: PathBuf,
    },

    /// The job was not started because an earlier job failed fatally.
    #[error("skipped {0} after a fatal failure")]
    Aborted(String),

    /// A queued job ended without reporting (panic or runtime shutdown).
    #[error("transfer of {0} did not complete")]
    Interrupted(String),
}

impl TransferError {
    /// Returns `true` for [`TransferError::Fatal`].
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Returns `true` when the batch retries this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_) | Self::Interrupted(_))
    }
}

impl From<RemoteError> for TransferError {
    fn from(error: RemoteError) -> Self {
        if error.is_fatal() {
            Self::Fatal(error)
        } else if let RemoteError::FileSystem(error) = error {
            Self::FileSystem(error)
        } else {
            Self::Retryable(error)
        }
    }
}
