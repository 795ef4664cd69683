use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Reasons a conversion is rejected.
///
/// None of these abort a batch; the job is marked rejected and its file is
/// left out of the upload.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The converter program could not be started.
    #[error("failed to start converter {program}: {source}")]
    Spawn {
        /// Program that was launched.
        program: String,
        /// OS error.
        #[source]
        source: io::Error,
    },

    /// The script failed (syntax error, missing module, bad export, ...).
    #[error("{0}")]
    Script(String),

    /// The child exited without a terminal message.
    #[error("converter exited without a result (exit code {code:?})")]
    NoResult {
        /// Exit code, if the child exited normally.
        code: Option<i32>,
    },

    /// The child did not answer in time.
    #[error("converter timed out after {0:?}")]
    Timeout(Duration),

    /// The child answered with something unusable.
    #[error("converter protocol violation: {0}")]
    Protocol(String),

    /// A local file operation failed.
    #[error("failed to {operation} {}: {source}", path.display())]
    Io {
        /// Path the operation targeted.
        path: PathBuf,
        /// Operation name.
        operation: &'static str,
        /// OS error.
        #[source]
        source: io::Error,
    },
}

impl ConversionError {
    pub(crate) fn io(path: impl Into<PathBuf>, operation: &'static str, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation,
            source,
        }
    }
}
