#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `filters` decides which local paths the sync engine leaves alone. Rules
//! use gitignore syntax and come from three places: a built-in list of
//! editor, OS and tooling artifacts, the nearest `.hsignore` above the
//! working directory, and paths protected at runtime (such as the watch
//! loop's own activity log).
//!
//! # Design
//!
//! - [`FilterRule`] captures one pattern together with its action and the
//!   flags derived from its spelling. [`parse_ignore_file`] turns ignore file
//!   text into rules.
//! - [`FilterSet`] compiles rules into `globset` matchers and evaluates them
//!   against relative paths. It carries no process state, so it can be
//!   tested in isolation.
//! - [`IgnoreRuleSet`] wraps a [`FilterSet`] with discovery of `.hsignore`,
//!   the search domain and runtime paths. It loads lazily, exactly once, and
//!   is shared behind an `Arc`.
//!
//! # Invariants
//!
//! - The last matching rule wins; unmatched paths are kept.
//! - A trailing `/` marks a directory-only rule. A `/` elsewhere anchors the
//!   rule to the search domain; other patterns match at any depth.
//! - An ignored directory ignores all of its descendants.
//! - Matching is case-insensitive.
//! - An empty relative path is never ignored.
//!
//! # Errors
//!
//! [`FilterSet::from_rules`] reports [`FilterError`] for an invalid glob.
//! [`IgnoreRuleSet`] never fails: a missing or unreadable `.hsignore`
//! contributes no rules and invalid patterns are skipped with a warning.
//!
//! # Examples
//!
//! ```
//! use filters::{FilterSet, parse_ignore_file};
//! use std::path::Path;
//!
//! let set = FilterSet::from_rules(parse_ignore_file("*.log\ndist/\n")).expect("rules compile");
//!
//! assert!(set.is_ignored(Path::new("debug.log"), false));
//! assert!(set.is_ignored(Path::new("dist/app.js"), false));
//! assert!(!set.is_ignored(Path::new("src/app.js"), false));
//! ```

mod action;
mod compiled;
mod defaults;
mod error;
mod ignore;
mod parse;
mod rule;
mod set;

pub use action::FilterAction;
pub use defaults::{DEFAULT_IGNORE_PATTERNS, LOCKFILE_PATTERN, default_rules};
pub use error::FilterError;
pub use ignore::{IGNORE_FILE_NAME, IgnoreRuleSet};
pub use parse::parse_ignore_file;
pub use rule::FilterRule;
pub use set::FilterSet;
