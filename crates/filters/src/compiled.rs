use globset::{GlobBuilder, GlobMatcher};

use crate::{FilterAction, FilterError, FilterRule};

/// A rule with its glob compiled.
///
/// Matching is case-insensitive and `*`/`?` never cross a `/`.
#[derive(Clone, Debug)]
pub(crate) struct CompiledRule {
    pub(crate) action: FilterAction,
    directory_only: bool,
    matcher: GlobMatcher,
}

impl CompiledRule {
    pub(crate) fn new(rule: &FilterRule) -> Result<Self, FilterError> {
        let glob = GlobBuilder::new(&rule.glob_expression())
            .literal_separator(true)
            .backslash_escape(true)
            .case_insensitive(true)
            .build()
            .map_err(|error| FilterError::new(rule.pattern.clone(), error))?;

        Ok(Self {
            action: rule.action,
            directory_only: rule.directory_only,
            matcher: glob.compile_matcher(),
        })
    }

    /// `candidate` is a `/`-joined relative path.
    pub(crate) fn matches(&self, candidate: &str, is_dir: bool) -> bool {
        if self.directory_only && !is_dir {
            return false;
        }
        self.matcher.is_match(candidate)
    }
}
