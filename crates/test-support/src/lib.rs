#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Shared test utilities for the hsync workspace.
//!
//! - [`MockRemoteStore`]: an in-memory [`remote::RemoteStore`] with scripted
//!   failures, a call log and in-flight instrumentation.
//! - [`FakeConverter`]: a POSIX shell stand-in for the fields harness.
//! - [`scratch_dir`]: a temporary directory whose name does not start with a
//!   dot, so default ignore rules never match the directory itself.

mod converter;
mod store;

pub use converter::FakeConverter;
pub use store::{Failure, MockCall, MockRemoteStore, Operation};

use std::io;

use tempfile::TempDir;

/// Creates a temporary directory prefixed with `hsync-`.
pub fn scratch_dir() -> io::Result<TempDir> {
    tempfile::Builder::new().prefix("hsync-").tempdir()
}
