//! Account and runtime settings shared by every operation.

use std::env::{self, VarError};
use std::ffi::OsString;
use std::time::Duration;

use fields::{ConverterCommand, DEFAULT_TIMEOUT, FieldsConverter, NODE_ENV_VAR};
use logging::LogConfig;
use remote::{Environment, HttpRemoteStore, ParseModeError, PublishMode, RemoteError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Account id variable.
pub const ACCOUNT_ID_ENV_VAR: &str = "HSSYNC_ACCOUNT_ID";
/// Access token variable.
pub const ACCESS_TOKEN_ENV_VAR: &str = "HSSYNC_ACCESS_TOKEN";
/// Environment variable (`prod` or `qa`).
pub const ENVIRONMENT_ENV_VAR: &str = "HSSYNC_ENV";
/// Publish mode variable (`draft` or `publish`).
pub const MODE_ENV_VAR: &str = "HSSYNC_MODE";
/// API base override.
pub const API_BASE_ENV_VAR: &str = "HSSYNC_API_BASE";
/// Conversion timeout in seconds.
pub const CONVERT_TIMEOUT_ENV_VAR: &str = "HSSYNC_CONVERT_TIMEOUT";

/// Errors raised while assembling a [`SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} is not set")]
    Missing(&'static str),
    /// A variable holds bytes that are not UTF-8.
    #[error("{0} must be valid UTF-8")]
    NotUnicode(String),
    /// A numeric variable did not parse.
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
    /// Environment or publish mode was not recognised.
    #[error(transparent)]
    Mode(#[from] ParseModeError),
    /// The API base is not a URL.
    #[error("invalid API base: {0}")]
    ApiBase(#[from] url::ParseError),
    /// The HTTP client could not be built.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Settings for talking to one account.
///
/// Deserializes from any serde format; missing optional fields take their
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Account (portal) id.
    pub account_id: u64,
    /// Bearer token.
    pub access_token: String,
    /// API base overriding the environment default.
    #[serde(default)]
    pub api_base: Option<Url>,
    /// Target environment.
    #[serde(default)]
    pub environment: Environment,
    /// Publish mode.
    #[serde(default)]
    pub mode: PublishMode,
    /// JavaScript runtime for the fields converter.
    #[serde(default)]
    pub node: Option<String>,
    /// Conversion timeout in seconds.
    #[serde(default = "default_convert_timeout")]
    pub convert_timeout_secs: u64,
    /// Subscriber settings for [`init_tracing`](logging::init_tracing).
    #[serde(default)]
    pub logging: LogConfig,
}

const fn default_convert_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl SyncConfig {
    /// Creates a configuration with defaults for everything but the
    /// credentials.
    pub fn new(account_id: u64, access_token: impl Into<String>) -> Self {
        Self {
            account_id,
            access_token: access_token.into(),
            api_base: None,
            environment: Environment::default(),
            mode: PublishMode::default(),
            node: None,
            convert_timeout_secs: default_convert_timeout(),
            logging: LogConfig::default(),
        }
    }

    /// Reads the `HSSYNC_*` variables of the current process.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| match env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(name.to_owned())),
        })
    }

    /// Reads the `HSSYNC_*` variables through `lookup`.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, ConfigError>,
    {
        let get = |name: &'static str| -> Result<Option<String>, ConfigError> {
            Ok(lookup(name)?
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()))
        };
        let required = |name: &'static str| get(name)?.ok_or(ConfigError::Missing(name));

        let account_id = parse_number(ACCOUNT_ID_ENV_VAR, &required(ACCOUNT_ID_ENV_VAR)?)?;
        let mut config = Self::new(account_id, required(ACCESS_TOKEN_ENV_VAR)?);
        if let Some(environment) = get(ENVIRONMENT_ENV_VAR)? {
            config.environment = environment.parse()?;
        }
        if let Some(mode) = get(MODE_ENV_VAR)? {
            config.mode = mode.parse()?;
        }
        if let Some(base) = get(API_BASE_ENV_VAR)? {
            config.api_base = Some(Url::parse(&base)?);
        }
        config.node = get(NODE_ENV_VAR)?;
        if let Some(timeout) = get(CONVERT_TIMEOUT_ENV_VAR)? {
            config.convert_timeout_secs = parse_number(CONVERT_TIMEOUT_ENV_VAR, &timeout)?;
        }
        Ok(config)
    }

    /// Conversion timeout as a duration.
    pub fn convert_timeout(&self) -> Duration {
        Duration::from_secs(self.convert_timeout_secs)
    }

    /// Converter honouring [`Self::node`] and the timeout.
    pub fn converter(&self) -> FieldsConverter {
        let command = self
            .node
            .as_ref()
            .map_or_else(ConverterCommand::node, |node| {
                ConverterCommand::node_at(OsString::from(node))
            });
        FieldsConverter::new(command).with_timeout(self.convert_timeout())
    }

    /// HTTP store for [`Self::api_base`] or the environment's API.
    pub fn http_store(&self) -> Result<HttpRemoteStore, ConfigError> {
        let store = match &self.api_base {
            Some(base) => HttpRemoteStore::new(base.clone(), self.access_token.clone())?,
            None => HttpRemoteStore::for_environment(self.environment, self.access_token.clone())?,
        };
        Ok(store)
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|number| *number > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            name,
            value: value.to_owned(),
        })
}
