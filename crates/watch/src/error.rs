use fields::ConversionError;
use remote::FileSystemError;
use thiserror::Error;
use transfer::TransferError;

/// Errors that stop a watch session or prevent it from starting.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The filesystem observer could not be created or attached.
    #[error("failed to watch files: {0}")]
    Observer(#[from] notify::Error),

    /// The initial upload failed fatally.
    #[error("initial upload failed: {0}")]
    InitialSync(#[from] TransferError),

    /// The conversion workspace could not be created.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A local file operation failed.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// The session task ended abnormally.
    #[error("watch task failed: {0}")]
    Task(String),
}
