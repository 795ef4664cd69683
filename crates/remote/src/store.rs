use std::path::Path;

use async_trait::async_trait;

use crate::{QueryValues, RemoteError, RemoteNode};

/// The file mapper operations the sync engine consumes.
///
/// Implementations must be shareable across queue workers. Every method maps
/// one remote call; retries and batching live in the callers.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Uploads the file at `local_path` to `remote_path`.
    async fn upload_file(
        &self,
        account_id: u64,
        local_path: &Path,
        remote_path: &str,
        query: &QueryValues,
    ) -> Result<(), RemoteError>;

    /// Streams the file at `remote_path` into `local_dest` and returns the
    /// node described by the response headers.
    async fn download_stream(
        &self,
        account_id: u64,
        remote_path: &str,
        local_dest: &Path,
        query: &QueryValues,
    ) -> Result<RemoteNode, RemoteError>;

    /// Lists the tree rooted at `remote_path`. The account root is requested
    /// as `@root`.
    async fn download_tree(
        &self,
        account_id: u64,
        remote_path: &str,
        query: &QueryValues,
    ) -> Result<RemoteNode, RemoteError>;

    /// Lists a tree of read-only default content.
    async fn download_default_tree(
        &self,
        account_id: u64,
        remote_path: &str,
        query: &QueryValues,
    ) -> Result<RemoteNode, RemoteError>;

    /// Deletes the file or folder at `remote_path`.
    async fn delete_remote(&self, account_id: u64, remote_path: &str) -> Result<(), RemoteError>;
}
