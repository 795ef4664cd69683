#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `watch` keeps a remote folder in step with a local tree. A session uploads
//! the whole tree once, then turns every filesystem change into exactly one
//! upload or delete on a bounded [`transfer::TransferQueue`].
//!
//! # Design
//!
//! - [`watch`] (or [`Watcher`]) attaches a `notify` observer and spawns the
//!   session task. The task walks [`WatchState`] forward:
//!   `Initializing`, `InitialSync`, `Watching`, `Stopped`.
//! - Raw observer events become [`WatchEvent`]s. Renames split into an
//!   unlink and an add.
//! - Uploads of convertible `fields.js` sources send the converted
//!   `fields.json` instead. A failed upload is retried once with the
//!   unconverted source; a second failure is recorded as a
//!   [`WatchFailure`].
//! - Two [`Debouncer`]s coalesce bursts: the activity log writes one block
//!   per quiet period once the block's actions finish. The theme preview
//!   notice follows successful uploads and deletes and is postponed while
//!   the queue still has work.
//!
//! # Errors
//!
//! [`WatchError`] covers failures that stop a session: observer setup, a
//! fatal initial upload and workspace creation. Per-event failures never stop
//! the session; they are reported through [`WatchHandle::failures`] and
//! [`WatchNotice::Failed`]. An activity log that cannot be written is
//! reported as [`WatchNotice::LogFailed`].

mod action;
mod debounce;
mod error;
mod event;
mod handle;
mod options;
mod preview;
mod session;
mod worker;

pub use action::{ActionOutcome, ActivityAction, ActivityEntry, WatchFailure};
pub use debounce::{ACTIVITY_QUIET_PERIOD, Debouncer, PREVIEW_QUIET_PERIOD, sleep_until_due};
pub use error::WatchError;
pub use event::{WatchEvent, WatchEventKind};
pub use handle::{WatchHandle, WatchNotice, WatchState};
pub use options::WatchOptions;
pub use preview::{THEME_MARKER, find_theme_name, theme_preview_url};
pub use session::{InitialUploadCallback, Watcher, watch};

#[cfg(test)]
mod tests;
