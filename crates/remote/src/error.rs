//! Error taxonomy for remote calls and local filesystem access.

use std::io;
use std::path::{Path, PathBuf};

use logging::ActivityLogError;
use thiserror::Error;

/// A filesystem primitive failed.
///
/// Carries the path, the attempted operation and the OS error so users see
/// which file could not be read or written.
#[derive(Debug, Error)]
#[error("failed to {operation} {}: {source}", path.display())]
pub struct FileSystemError {
    path: PathBuf,
    operation: &'static str,
    #[source]
    source: io::Error,
}

impl FileSystemError {
    /// Creates an error for `operation` on `path`.
    pub fn new(path: impl Into<PathBuf>, operation: &'static str, source: io::Error) -> Self {
        Self {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Path the operation targeted.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Operation name, such as `read` or `create directory`.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Kind of the underlying OS error.
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

impl From<ActivityLogError> for FileSystemError {
    fn from(error: ActivityLogError) -> Self {
        let (path, source) = error.into_parts();
        Self::new(path, "append to", source)
    }
}

/// Extension trait attaching path and operation context to I/O results.
pub trait IoResultExt<T> {
    /// Maps an I/O error to [`FileSystemError`].
    fn with_path(
        self,
        path: impl Into<PathBuf>,
        operation: &'static str,
    ) -> Result<T, FileSystemError>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path(
        self,
        path: impl Into<PathBuf>,
        operation: &'static str,
    ) -> Result<T, FileSystemError> {
        self.map_err(|source| FileSystemError::new(path, operation, source))
    }
}

/// Failure of one remote call.
///
/// [`is_fatal`](Self::is_fatal) separates authentication and authorization
/// failures, which abort a whole batch, from everything else, which is
/// retried once.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The account credentials were refused (HTTP 401 or 403).
    #[error("not authorized to access {path} (HTTP {status}): {message}")]
    Unauthorized {
        /// Remote path of the call.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },

    /// The remote answered with any other error status.
    #[error("request for {path} failed (HTTP {status}): {message}")]
    Rejected {
        /// Remote path of the call.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },

    /// The request never produced a response.
    #[error("request for {path} failed: {message}")]
    Transport {
        /// Remote path of the call.
        path: String,
        /// Client error description.
        message: String,
    },

    /// The response could not be understood.
    #[error("invalid response for {path}: {message}")]
    InvalidResponse {
        /// Remote path of the call.
        path: String,
        /// Decode or validation failure.
        message: String,
    },

    /// A local file could not be read or written.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),
}

impl RemoteError {
    /// Builds the error for an HTTP error status.
    pub fn from_status(path: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        let path = path.into();
        let message = message.into();
        if matches!(status, 401 | 403) {
            Self::Unauthorized {
                path,
                status,
                message,
            }
        } else {
            Self::Rejected {
                path,
                status,
                message,
            }
        }
    }

    /// Builds a transport error.
    pub fn transport(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for authentication and authorization failures.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// HTTP status, when the remote answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Rejected { status, .. } => Some(*status),
            Self::Transport { .. } | Self::InvalidResponse { .. } | Self::FileSystem(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_are_fatal() {
        assert!(RemoteError::from_status("a.css", 401, "expired").is_fatal());
        assert!(RemoteError::from_status("a.css", 403, "scope").is_fatal());
        assert!(!RemoteError::from_status("a.css", 400, "invalid").is_fatal());
        assert!(!RemoteError::from_status("a.css", 500, "oops").is_fatal());
        assert!(!RemoteError::transport("a.css", "reset").is_fatal());
    }

    #[test]
    fn status_is_exposed() {
        assert_eq!(RemoteError::from_status("a", 404, "").status(), Some(404));
        assert_eq!(RemoteError::transport("a", "timeout").status(), None);
    }

    #[test]
    fn filesystem_error_names_path_and_operation() {
        let error: Result<(), _> =
            Err(io::Error::from(io::ErrorKind::NotFound)).with_path("/tmp/x.css", "read");
        let error = error.expect_err("mapped");
        assert_eq!(error.operation(), "read");
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
        let text = error.to_string();
        assert!(text.contains("failed to read"));
        assert!(text.contains("/tmp/x.css"));
    }
}
