use std::path::Path;
use std::sync::Arc;

use fields::FieldsConverter;
use filters::IgnoreRuleSet;
use remote::{Environment, PublishMode, RemoteStore};
use transfer::{
    DownloadOptions, DownloadReport, TransferResult, UploadOptions, collect_local_files,
    download_path, upload_tree,
};
use watch::{InitialUploadCallback, WatchHandle, WatchOptions, Watcher};

use crate::config::SyncConfig;
use crate::error::SyncError;

/// One account on one remote store.
///
/// The client's environment, publish mode and converter override the
/// corresponding fields of the per-operation options.
#[derive(Clone)]
pub struct Client {
    store: Arc<dyn RemoteStore>,
    account_id: u64,
    environment: Environment,
    mode: PublishMode,
    converter: Option<FieldsConverter>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("account_id", &self.account_id)
            .field("environment", &self.environment)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client over `store`.
    pub fn new(store: Arc<dyn RemoteStore>, account_id: u64) -> Self {
        Self {
            store,
            account_id,
            environment: Environment::default(),
            mode: PublishMode::default(),
            converter: None,
        }
    }

    /// Creates an HTTP-backed client from `config`.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let store = Arc::new(config.http_store()?);
        Ok(Self::new(store, config.account_id)
            .with_environment(config.environment)
            .with_mode(config.mode)
            .with_converter(config.converter()))
    }

    /// Sets the target environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the publish mode.
    pub fn with_mode(mut self, mode: PublishMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the converter used for `fields.js` sources.
    pub fn with_converter(mut self, converter: FieldsConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Account id.
    pub fn account_id(&self) -> u64 {
        self.account_id
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    /// Uploads every non-ignored file below `local_root` to `remote_root`.
    ///
    /// Without explicit rules the nearest `.hsignore` above `local_root` is
    /// used.
    pub async fn upload_folder(
        &self,
        local_root: &Path,
        remote_root: &str,
        options: UploadOptions,
    ) -> Result<Vec<TransferResult>, SyncError> {
        let mut options = options.with_environment(self.environment);
        if let Some(converter) = &self.converter {
            options = options.with_converter(converter.clone());
        }
        let ignore = options
            .ignore
            .clone()
            .unwrap_or_else(|| Arc::new(IgnoreRuleSet::with_start_dir(local_root)));
        let files = collect_local_files(local_root, Some(&ignore), options.in_project)?;
        tracing::info!(
            target: "hsync::upload",
            "uploading {} files from {} to {remote_root}",
            files.len(),
            local_root.display()
        );
        let options = options.with_ignore(ignore);
        let results = upload_tree(
            Arc::clone(&self.store),
            self.account_id,
            local_root,
            remote_root,
            &options,
            &files,
            self.mode,
        )
        .await?;
        Ok(results)
    }

    /// Downloads `remote_src` into `local_dest`.
    pub async fn download(
        &self,
        remote_src: &str,
        local_dest: &Path,
        options: DownloadOptions,
    ) -> Result<DownloadReport, SyncError> {
        let options = options.with_environment(self.environment);
        let report = download_path(
            Arc::clone(&self.store),
            self.account_id,
            remote_src,
            local_dest,
            self.mode,
            &options,
        )
        .await?;
        Ok(report)
    }

    /// Starts watching `local_root` and mirroring changes to `remote_root`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn watch(
        &self,
        local_root: &Path,
        remote_root: &str,
        options: WatchOptions,
        on_initial_upload_done: Option<InitialUploadCallback>,
    ) -> Result<WatchHandle, SyncError> {
        let handle = Watcher::new(
            Arc::clone(&self.store),
            self.account_id,
            local_root,
            remote_root,
            self.watch_options(options),
        )
        .start(on_initial_upload_done)?;
        Ok(handle)
    }

    fn watch_options(&self, options: WatchOptions) -> WatchOptions {
        let options = options
            .with_environment(self.environment)
            .with_mode(self.mode);
        match &self.converter {
            Some(converter) => options.with_converter(converter.clone()),
            None => options,
        }
    }
}
