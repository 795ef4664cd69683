use std::fmt;

/// Outcome a rule assigns to the paths it matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FilterAction {
    /// Re-include the matching path (a `!` line in an ignore file).
    Include,
    /// Ignore the matching path.
    Exclude,
}

impl fmt::Display for FilterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => f.write_str("include"),
            Self::Exclude => f.write_str("exclude"),
        }
    }
}
