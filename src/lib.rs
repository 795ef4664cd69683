#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `hsync` keeps a local directory tree and a file mapper content store in
//! step. It uploads folders with bounded concurrency and one retry pass,
//! materializes remote trees on disk, and watches a local tree so every
//! change becomes a single remote upload or delete.
//!
//! # Design
//!
//! The facade is a thin layer over the workspace crates:
//!
//! - [`Client`] binds a [`RemoteStore`] to an account and exposes the three
//!   entry points [`Client::upload_folder`], [`Client::download`] and
//!   [`Client::watch`].
//! - [`SyncConfig`] reads credentials and runtime settings from the
//!   environment (or any serde source) and builds an HTTP-backed client.
//! - [`paths`], [`filters`], [`fields`], [`transfer`] and [`watch`] are
//!   re-exported for callers that need the lower-level pieces.
//!
//! # Errors
//!
//! Every entry point returns [`SyncError`]. Per-file failures never surface
//! as errors: batch operations return a complete result list and only fatal
//! remote failures (rejected credentials) or initialization failures abort.
//!
//! # Examples
//!
//! ```no_run
//! use hsync::{Client, SyncConfig, UploadOptions};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::from_env()?;
//! let client = Client::from_config(&config)?;
//! let results = client
//!     .upload_folder(Path::new("my-theme"), "my-theme", UploadOptions::default())
//!     .await?;
//! println!("{} files uploaded", results.iter().filter(|r| r.is_success()).count());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;

pub use client::Client;
pub use config::{ConfigError, SyncConfig};
pub use error::SyncError;

pub use fields::{ConvertOptions, ConverterCommand, FieldsConverter};
pub use filters::IgnoreRuleSet;
pub use logging::{LogConfig, init_tracing};
pub use remote::{Environment, HttpRemoteStore, PublishMode, RemoteError, RemoteNode, RemoteStore};
pub use transfer::{
    DownloadOptions, DownloadReport, DownloadStatus, TransferOutcome, TransferResult,
    UploadOptions,
};
pub use watch::{WatchEvent, WatchHandle, WatchNotice, WatchOptions, WatchState};

pub use fields;
pub use filters;
pub use paths;
pub use transfer;
pub use watch;
