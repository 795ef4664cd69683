use remote::FileSystemError;
use thiserror::Error;
use transfer::TransferError;
use watch::WatchError;

use crate::config::ConfigError;

/// Errors returned by the [`Client`](crate::Client) entry points.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration could not be turned into a client.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An upload or download aborted.
    #[error(transparent)]
    Transfer(#[from] TransferError),
    /// A watch session could not start or ended with an error.
    #[error(transparent)]
    Watch(#[from] WatchError),
    /// The local tree could not be read.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),
}

impl SyncError {
    /// Returns `true` when the remote side rejected the credentials.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Transfer(error) => error.is_fatal(),
            Self::Watch(WatchError::InitialSync(error)) => error.is_fatal(),
            _ => false,
        }
    }
}
