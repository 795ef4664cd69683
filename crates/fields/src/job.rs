use std::fs;
use std::path::{Path, PathBuf};

use crate::{ConversionError, SAVED_OUTPUT_FILE_NAME};

/// One convertible source and its outcome.
///
/// A job is either resolved (it has an output path) or rejected (it has a
/// reason instead). The two states are exclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionJob {
    project_root: PathBuf,
    source_path: PathBuf,
    write_dir: PathBuf,
    field_options: String,
    outcome: Result<PathBuf, String>,
}

impl ConversionJob {
    /// Creates a resolved job.
    pub fn resolved(
        project_root: impl Into<PathBuf>,
        source_path: impl Into<PathBuf>,
        write_dir: impl Into<PathBuf>,
        field_options: impl Into<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            source_path: source_path.into(),
            write_dir: write_dir.into(),
            field_options: field_options.into(),
            outcome: Ok(output_path.into()),
        }
    }

    /// Creates a rejected job.
    pub fn rejected(
        project_root: impl Into<PathBuf>,
        source_path: impl Into<PathBuf>,
        write_dir: impl Into<PathBuf>,
        field_options: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            source_path: source_path.into(),
            write_dir: write_dir.into(),
            field_options: field_options.into(),
            outcome: Err(reason.into()),
        }
    }

    /// Returns `true` when the conversion failed.
    pub fn is_rejected(&self) -> bool {
        self.outcome.is_err()
    }

    /// Path of the produced document, absent when rejected.
    pub fn output_path(&self) -> Option<&Path> {
        self.outcome.as_ref().ok().map(PathBuf::as_path)
    }

    /// Why the conversion was rejected.
    pub fn rejection_reason(&self) -> Option<&str> {
        self.outcome.as_ref().err().map(String::as_str)
    }

    /// Project root the source lives under.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Absolute path of the convertible source.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Directory outputs are written below.
    pub fn write_dir(&self) -> &Path {
        &self.write_dir
    }

    /// Option string handed to the script.
    pub fn field_options(&self) -> &str {
        &self.field_options
    }

    /// Where [`save_output`](Self::save_output) copies the document.
    pub fn saved_output_path(&self) -> PathBuf {
        self.source_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(SAVED_OUTPUT_FILE_NAME)
    }

    /// Copies the produced document next to the source.
    ///
    /// Returns the written path, or `None` for a rejected job.
    pub fn save_output(&self) -> Result<Option<PathBuf>, ConversionError> {
        let Some(output) = self.output_path() else {
            return Ok(None);
        };
        let target = self.saved_output_path();
        fs::copy(output, &target).map_err(|source| ConversionError::io(&target, "save", source))?;
        Ok(Some(target))
    }
}
