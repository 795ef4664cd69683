#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `transfer` moves files between a local tree and a [`remote::RemoteStore`].
//! Uploads go through [`upload_tree`], downloads through [`download_path`].
//! Both run their remote calls on a [`TransferQueue`] that never lets more
//! than ten operations run at once.
//!
//! # Design
//!
//! - [`partition`] groups upload candidates into [`FileCategory`] buckets.
//!   Categories are submitted in priority order so that assets other files
//!   reference exist on the remote side first.
//! - Upload failures are captured into [`TransferResult`] records. The batch
//!   drains, retries every retryable failure once, and only returns `Err` for
//!   a fatal (authentication) failure or an initialization error.
//! - Folder downloads list the remote tree once, then [`traverse`] it in
//!   pre-order, queueing one materialization job per node.
//!
//! # Invariants
//!
//! - At most [`DEFAULT_CONCURRENCY`] jobs run per queue unless overridden.
//! - Every file is attempted at most twice per batch.
//! - Partitioning is idempotent: partitioning the flattened output again
//!   yields the same partition.
//!
//! # Errors
//!
//! [`TransferError`] separates fatal failures from retryable ones;
//! [`TransferError::is_fatal`] is the abort criterion.

mod category;
mod download;
mod error;
mod outcome;
mod queue;
mod upload;
mod walk;

pub use category::{FileCategory, Partition, partition};
pub use download::{
    DownloadFailure, DownloadOptions, DownloadReport, DownloadStatus, download_path, traverse,
};
pub use error::TransferError;
pub use outcome::{TransferOutcome, TransferResult};
pub use queue::{Completion, DEFAULT_CONCURRENCY, TransferQueue};
pub use upload::{UploadOptions, upload_tree};
pub use walk::collect_local_files;

#[cfg(test)]
mod tests;
