#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `fields` turns `fields.js` modules into static `fields.json` documents
//! before upload. The module is arbitrary code: it may import packages, touch
//! globals or never terminate. Evaluation therefore happens in a child
//! process and the parent only ever sees one protocol line.
//!
//! # Design
//!
//! - [`is_convertible`] decides whether a path goes through the converter.
//! - [`FieldsConverter::convert`] launches [`ConverterCommand`] (by default
//!   `node` running an embedded harness), waits for a [`ChildMessage`] on the
//!   child's stdout, and returns a [`ConversionJob`].
//! - [`ConversionWorkspace`] owns the temporary directory outputs are written
//!   to for the duration of a batch.
//!
//! # Invariants
//!
//! - A [`ConversionJob`] is resolved with an output path or rejected with a
//!   reason, never both and never neither.
//! - Script errors, missing terminal messages, spawn failures and timeouts
//!   all reject the job; none of them surface as `Err`.
//! - Outputs land at `write_dir/<source dir relative to the project
//!   root>/fields.json`.
//!
//! # Errors
//!
//! [`ConversionError`] describes why a job was rejected. It is returned
//! directly only by [`ConversionWorkspace`] and
//! [`ConversionJob::save_output`].
//!
//! # Examples
//!
//! ```
//! use fields::ConversionJob;
//!
//! let job = ConversionJob::rejected("/p", "/p/fields.js", "/tmp/out", "", "does not export a function");
//! assert!(job.is_rejected());
//! assert!(job.output_path().is_none());
//! ```

mod command;
mod converter;
mod eligibility;
mod error;
mod job;
mod message;
mod options;
mod workspace;

pub use command::{ConverterCommand, HARNESS_FILE_NAME, HARNESS_SOURCE, NODE_ENV_VAR};
pub use converter::{DEFAULT_TIMEOUT, FieldsConverter};
pub use eligibility::{
    CONVERTIBLE_FILE_NAMES, OUTPUT_FILE_NAME, SAVED_OUTPUT_FILE_NAME, is_convertible,
    is_convertible_name,
};
pub use error::ConversionError;
pub use job::ConversionJob;
pub use message::ChildMessage;
pub use options::ConvertOptions;
pub use workspace::{ConversionWorkspace, WORKSPACE_PREFIX};
