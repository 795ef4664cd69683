//! Subscriber configuration.

use crate::LogTarget;

/// Environment variable holding `EnvFilter` directives that override the
/// configured verbosity.
pub const LOG_ENV_VAR: &str = "HSSYNC_LOG";

/// Configuration for [`init_tracing`](crate::init_tracing).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct LogConfig {
    /// Verbose level (0-3).
    pub verbosity: u8,
    /// Whether the fmt layer emits ANSI colours.
    pub ansi: bool,
    /// Whether events carry their target.
    pub show_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            verbosity: 1,
            ansi: false,
            show_targets: false,
        }
    }
}

impl LogConfig {
    /// Creates a configuration for the given verbose level.
    pub fn from_verbose_level(level: u8) -> Self {
        Self {
            verbosity: level,
            show_targets: level >= 2,
            ..Self::default()
        }
    }

    /// Enables or disables ANSI colours.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Renders the `EnvFilter` directives implied by the verbose level.
    ///
    /// Events outside the hsync targets are limited to warnings.
    pub fn directives(&self) -> String {
        let mut directives = String::from("warn");
        for target in LogTarget::ALL {
            directives.push(',');
            directives.push_str(target.as_str());
            directives.push('=');
            directives.push_str(
                &target
                    .level_for_verbosity(self.verbosity)
                    .to_string()
                    .to_ascii_lowercase(),
            );
        }
        directives
    }
}
