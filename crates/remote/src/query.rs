//! Query values attached to every file mapper call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether uploads land in the draft buffer or go live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Write to the draft buffer.
    Draft,
    /// Publish immediately.
    #[default]
    Publish,
}

/// Target platform environment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production.
    #[default]
    Prod,
    /// QA / staging.
    Qa,
}

impl Environment {
    /// Numeric id sent as `environmentId`.
    pub const fn id(self) -> u8 {
        match self {
            Self::Prod => 1,
            Self::Qa => 2,
        }
    }

    /// Environment selected by a "staging" flag.
    pub const fn from_staging(staging: bool) -> Self {
        if staging { Self::Qa } else { Self::Prod }
    }
}

/// An environment or publish mode string was not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
}

impl FromStr for PublishMode {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "publish" => Ok(Self::Publish),
            _ => Err(ParseModeError {
                kind: "publish mode",
                value: value.to_owned(),
            }),
        }
    }
}

impl FromStr for Environment {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Ok(Self::Prod),
            "qa" | "staging" => Ok(Self::Qa),
            _ => Err(ParseModeError {
                kind: "environment",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PublishMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
        })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prod => "prod",
            Self::Qa => "qa",
        })
    }
}

/// `buffer`, `environmentId` and optional `version` query parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryValues {
    /// Draft mode.
    pub buffer: bool,
    /// `1` for production, `2` for QA.
    pub environment_id: u8,
    /// Asset version for default-content downloads.
    pub version: Option<String>,
}

impl Default for QueryValues {
    fn default() -> Self {
        Self::new(PublishMode::default(), Environment::default())
    }
}

impl QueryValues {
    /// Builds the values for a publish mode and environment.
    pub fn new(mode: PublishMode, environment: Environment) -> Self {
        Self {
            buffer: mode == PublishMode::Draft,
            environment_id: environment.id(),
            version: None,
        }
    }

    /// Sets the asset version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Key/value pairs in the order they are appended to a URL.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("buffer", self.buffer.to_string()),
            ("environmentId", self.environment_id.to_string()),
        ];
        if let Some(version) = &self.version {
            pairs.push(("version", version.clone()));
        }
        pairs
    }
}
