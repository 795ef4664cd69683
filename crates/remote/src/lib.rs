#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `remote` is the seam between the sync engine and the file mapper content
//! store. It defines the [`RemoteStore`] contract the upload scheduler,
//! download materializer and watch loop call through, the [`RemoteNode`]
//! tree model returned by listings, the query values every call carries, and
//! [`HttpRemoteStore`], the production implementation.
//!
//! # Design
//!
//! - [`RemoteStore`] is an object-safe async trait so callers hold an
//!   `Arc<dyn RemoteStore>` and tests substitute an in-memory store.
//! - [`RemoteError`] classifies failures once, at the boundary:
//!   [`RemoteError::is_fatal`] is `true` only for authentication and
//!   authorization failures.
//! - [`FileSystemError`] wraps OS errors with the path and operation via
//!   [`IoResultExt::with_path`].
//!
//! # Invariants
//!
//! - A [`RemoteNode`] decoded with [`RemoteNode::from_json`] never has a file
//!   node with children and never has a child name that escapes its parent.
//!
//! # Examples
//!
//! ```
//! use remote::{Environment, PublishMode, QueryValues, RemoteError};
//!
//! let query = QueryValues::new(PublishMode::Draft, Environment::Qa);
//! assert!(query.buffer);
//! assert_eq!(query.environment_id, 2);
//!
//! assert!(RemoteError::from_status("/theme/main.css", 401, "expired").is_fatal());
//! ```

mod error;
mod http;
mod node;
mod query;
mod store;

pub use error::{FileSystemError, IoResultExt, RemoteError};
pub use http::{HttpRemoteStore, PROD_API_BASE, QA_API_BASE, ROOT_LISTING_PATH};
pub use node::{NodeError, RemoteNode};
pub use query::{Environment, ParseModeError, PublishMode, QueryValues};
pub use store::RemoteStore;
