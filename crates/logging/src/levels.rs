//! Subsystem targets and the verbosity at which each becomes visible.

use std::fmt;

use tracing::level_filters::LevelFilter;

/// Tracing target for each hsync subsystem.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogTarget {
    /// Upload scheduler.
    Upload,
    /// Download materializer.
    Download,
    /// Remote deletions.
    Delete,
    /// Fields conversion.
    Convert,
    /// Watch loop.
    Watch,
    /// Ignore rule evaluation.
    Filter,
}

impl LogTarget {
    /// Every target, in the order directives are emitted.
    pub const ALL: [Self; 6] = [
        Self::Upload,
        Self::Download,
        Self::Delete,
        Self::Convert,
        Self::Watch,
        Self::Filter,
    ];

    /// Returns the tracing target string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "hsync::upload",
            Self::Download => "hsync::download",
            Self::Delete => "hsync::delete",
            Self::Convert => "hsync::convert",
            Self::Watch => "hsync::watch",
            Self::Filter => "hsync::filter",
        }
    }

    /// Returns the level this target is filtered at for a verbose level.
    ///
    /// Level 0 keeps warnings only, level 1 shows per-file transfer lines,
    /// level 2 adds conversion and watch diagnostics, level 3 and above
    /// enables everything.
    #[must_use]
    pub fn level_for_verbosity(self, verbosity: u8) -> LevelFilter {
        let chatty = matches!(self, Self::Convert | Self::Watch | Self::Filter);
        match (verbosity, chatty) {
            (0, _) => LevelFilter::WARN,
            (1, false) => LevelFilter::INFO,
            (1, true) => LevelFilter::WARN,
            (2, _) => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
