use std::path::Path;

use tempfile::TempDir;

use crate::ConversionError;

/// Prefix of the temporary directory conversion outputs are written to.
pub const WORKSPACE_PREFIX: &str = "hsync-fieldsjs-output-";

/// Temporary output directory owned by one upload batch or watch session.
///
/// The directory is removed by [`cleanup`](Self::cleanup), or on drop if
/// cleanup is never called.
#[derive(Debug)]
pub struct ConversionWorkspace {
    dir: TempDir,
}

impl ConversionWorkspace {
    /// Creates a workspace in the system temporary directory.
    pub fn create() -> Result<Self, ConversionError> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()
            .map_err(|source| ConversionError::io(std::env::temp_dir(), "create", source))?;
        Ok(Self { dir })
    }

    /// Creates a workspace inside `parent`.
    pub fn create_in(parent: &Path) -> Result<Self, ConversionError> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)
            .map_err(|source| ConversionError::io(parent, "create", source))?;
        Ok(Self { dir })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the directory and everything in it.
    pub fn cleanup(self) -> Result<(), ConversionError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| ConversionError::io(path, "remove", source))
    }
}
