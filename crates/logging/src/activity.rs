//! Append-only activity log used by the watch loop.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Failure to append to the activity log.
#[derive(Debug, Error)]
#[error("failed to append to activity log {}: {source}", path.display())]
pub struct ActivityLogError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl ActivityLogError {
    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consumes the error and returns the path and OS error.
    pub fn into_parts(self) -> (PathBuf, io::Error) {
        (self.path, self.source)
    }
}

/// File sink that receives one block per debounced batch of watch actions.
#[derive(Clone, Debug)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    /// Creates a sink writing to `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `text` verbatim.
    pub fn append(&self, text: &str) -> Result<(), ActivityLogError> {
        let wrap = |source| ActivityLogError {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(wrap)?;
        file.write_all(text.as_bytes()).map_err(wrap)?;
        file.flush().map_err(wrap)
    }

    /// Formats one entry line: `<ISO-8601 timestamp> <action>: <path>`.
    pub fn format_entry(at: DateTime<Utc>, action: &str, path: &str) -> String {
        format!(
            "{} {action}: {path}\n",
            at.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}
