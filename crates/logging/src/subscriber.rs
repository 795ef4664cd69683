//! Global subscriber installation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{LogConfig, init_tracing};
//!
//! init_tracing(&LogConfig::from_verbose_level(1))?;
//! logging::trace_upload!("uploaded {}", path);
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::{LOG_ENV_VAR, LogConfig};

/// Builds the filter for `config`.
///
/// Directives from [`LOG_ENV_VAR`] win when present and valid; otherwise the
/// verbose level decides.
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(config.directives()))
}

/// Installs the global subscriber: an `EnvFilter` plus a fmt layer writing to
/// stderr.
///
/// Returns an error if another global subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<(), TryInitError> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_target(config.show_targets);

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt_layer)
        .try_init()
}
