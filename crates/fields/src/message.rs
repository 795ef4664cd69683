use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Terminal message written by the converter child as one JSON line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "UPPERCASE")]
pub enum ChildMessage {
    /// Conversion succeeded.
    Complete {
        /// Path of the written document.
        #[serde(rename = "finalPath")]
        final_path: PathBuf,
    },
    /// Conversion failed.
    Error {
        /// Human-readable reason.
        message: String,
    },
}
