#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` owns the diagnostic surface of the hsync workspace: the tracing
//! targets each subsystem reports on, the subscriber installed by front ends,
//! and the append-only activity log written by the watch loop.
//!
//! # Design
//!
//! - [`LogTarget`] enumerates the subsystems (`hsync::upload`,
//!   `hsync::download`, ...) and the `trace_*!` macros emit events on those
//!   targets so filtering by subsystem works with plain `EnvFilter` syntax.
//! - [`LogConfig`] maps a verbosity level onto per-target directives.
//!   [`init_tracing`] installs a `tracing-subscriber` registry with an
//!   [`EnvFilter`](tracing_subscriber::EnvFilter) built from `HSSYNC_LOG` when
//!   it is set, or from the configured verbosity otherwise.
//! - [`ActivityLog`] appends timestamped blocks to a user-chosen file.
//!
//! # Errors
//!
//! [`init_tracing`] reports a
//! [`TryInitError`](tracing_subscriber::util::TryInitError) when a global
//! subscriber is already installed. [`ActivityLog::append`] reports
//! [`ActivityLogError`] carrying the log path and the OS error.
//!
//! # Examples
//!
//! ```
//! use logging::{LogConfig, LogTarget};
//!
//! let config = LogConfig::from_verbose_level(2);
//! let directives = config.directives();
//! assert!(directives.contains(LogTarget::Upload.as_str()));
//! ```

mod activity;
mod config;
mod levels;
mod subscriber;
mod tracing_macros;

pub use activity::{ActivityLog, ActivityLogError};
pub use config::{LOG_ENV_VAR, LogConfig};
pub use levels::LogTarget;
pub use subscriber::{build_filter, init_tracing};

#[cfg(test)]
mod tests;
