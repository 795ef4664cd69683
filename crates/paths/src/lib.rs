#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `paths` classifies path strings the way the file mapper API understands
//! them. The remote side has no notion of "file" or "directory" metadata for a
//! path that has not been fetched yet, so the engine decides from the string
//! alone: a path with a recognised extension is a file, a path ending in the
//! reserved `.module` suffix is a module folder, and everything else is a
//! folder.
//!
//! # Design
//!
//! - [`classify`] returns a [`PathKind`] and is the single source of truth for
//!   the predicate helpers ([`is_root`], [`is_module_folder`], [`is_file`],
//!   [`is_folder`]).
//! - [`extension`] and [`is_allowed_extension`] implement the extension
//!   allow-list that gates uploads and downloads.
//! - The [`remote`] module converts local paths into forward-slash remote
//!   paths and joins remote path segments.
//!
//! # Invariants
//!
//! - Classification never panics and never touches the filesystem.
//! - Leading and trailing whitespace (including tabs) is ignored.
//! - For every input exactly one of [`is_file`] and [`is_folder`] holds, and
//!   [`is_root`] implies [`is_folder`].
//!
//! # Examples
//!
//! ```
//! use paths::{PathKind, classify, is_file, is_folder};
//!
//! assert_eq!(classify("/"), PathKind::Root);
//! assert_eq!(classify("theme/cards.module"), PathKind::Module);
//! assert!(is_file("theme/css/main.css"));
//! assert!(is_folder("theme/templates"));
//! assert!(is_folder("api.functions"));
//! ```

mod classify;
mod extension;
pub mod remote;

pub use classify::{
    DEFAULT_CONTENT_ROOT, PathKind, classify, is_default_content, is_file, is_folder,
    is_module_child, is_module_folder, is_root,
};
pub use extension::{
    ALLOWED_EXTENSIONS, FUNCTIONS_EXTENSION, MODULE_EXTENSION, extension, is_allowed_extension,
};
pub use remote::{remote_basename, remote_dirname, remote_join, remote_sibling, to_remote_path};
