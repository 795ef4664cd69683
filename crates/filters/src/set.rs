use std::path::{Component, Path};
use std::sync::Arc;

use crate::{FilterAction, FilterError, FilterRule, compiled::CompiledRule};

/// Compiled, immutable collection of ignore rules.
///
/// Rules are evaluated in definition order and the last matching rule
/// decides. A path whose ancestor directory is ignored is ignored too, so a
/// later `!` rule cannot re-include a file below an ignored directory. Paths
/// that match no rule are kept.
///
/// `FilterSet` is cheaply cloneable (the compiled rules sit behind an
/// [`Arc`]).
///
/// # Examples
///
/// ```
/// use filters::{FilterRule, FilterSet};
/// use std::path::Path;
///
/// let set = FilterSet::from_rules([
///     FilterRule::exclude("*.log"),
///     FilterRule::include("keep.log"),
/// ]).unwrap();
///
/// assert!(set.is_ignored(Path::new("logs/debug.log"), false));
/// assert!(!set.is_ignored(Path::new("keep.log"), false));
/// assert!(set.allows(Path::new("README.md"), false));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FilterSet {
    rules: Arc<Vec<CompiledRule>>,
}

impl FilterSet {
    /// Compiles `rules`, failing on the first invalid pattern.
    pub fn from_rules<I>(rules: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = FilterRule>,
    {
        let compiled = rules
            .into_iter()
            .map(|rule| CompiledRule::new(&rule))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rules: Arc::new(compiled),
        })
    }

    /// Compiles `rules`, dropping invalid patterns and returning their errors.
    pub fn from_rules_skipping_invalid<I>(rules: I) -> (Self, Vec<FilterError>)
    where
        I: IntoIterator<Item = FilterRule>,
    {
        let mut compiled = Vec::new();
        let mut errors = Vec::new();
        for rule in rules {
            match CompiledRule::new(&rule) {
                Ok(rule) => compiled.push(rule),
                Err(error) => errors.push(error),
            }
        }
        (
            Self {
                rules: Arc::new(compiled),
            },
            errors,
        )
    }

    /// Number of compiled rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` if `path` (relative to the search domain) is ignored.
    ///
    /// Root and prefix components are skipped, so an absolute path is
    /// matched relative to the filesystem root. An empty path is never
    /// ignored. `is_dir` applies to the final component only; every ancestor
    /// is treated as a directory.
    #[must_use]
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let components: Vec<_> = path
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy()),
                Component::ParentDir => Some("..".into()),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
            })
            .collect();

        let mut candidate = String::new();
        for (index, component) in components.iter().enumerate() {
            if !candidate.is_empty() {
                candidate.push('/');
            }
            candidate.push_str(component);

            let is_last = index + 1 == components.len();
            let excluded =
                self.decision(&candidate, !is_last || is_dir) == Some(FilterAction::Exclude);
            if excluded || is_last {
                return excluded;
            }
        }
        false
    }

    /// Inverse of [`is_ignored`](Self::is_ignored).
    #[must_use]
    pub fn allows(&self, path: &Path, is_dir: bool) -> bool {
        !self.is_ignored(path, is_dir)
    }

    fn decision(&self, candidate: &str, is_dir: bool) -> Option<FilterAction> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(candidate, is_dir))
            .map(|rule| rule.action)
    }
}
