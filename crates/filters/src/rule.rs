use crate::FilterAction;

/// One gitignore-style rule.
///
/// The pattern keeps its original spelling. Directory-only and anchoring
/// flags are derived on construction:
///
/// - a trailing `/` restricts the rule to directories;
/// - a `/` anywhere else anchors the rule to the search domain;
/// - unanchored patterns match at any depth.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterRule {
    pub(crate) action: FilterAction,
    pub(crate) pattern: String,
    pub(crate) directory_only: bool,
    pub(crate) anchored: bool,
}

impl FilterRule {
    /// Creates a rule that re-includes `pattern`.
    #[must_use]
    pub fn include(pattern: impl Into<String>) -> Self {
        Self::with_action(FilterAction::Include, pattern.into())
    }

    /// Creates a rule that ignores `pattern`.
    #[must_use]
    pub fn exclude(pattern: impl Into<String>) -> Self {
        Self::with_action(FilterAction::Exclude, pattern.into())
    }

    fn with_action(action: FilterAction, pattern: String) -> Self {
        let body = pattern.trim_end_matches('/');
        let directory_only = !body.is_empty() && body.len() < pattern.len();
        let anchored = body.contains('/');
        Self {
            action,
            pattern,
            directory_only,
            anchored,
        }
    }

    /// Parses one line of an ignore file.
    ///
    /// Blank lines and `#` comments yield `None`. A leading `!` negates the
    /// rule; `\!` and `\#` escape those characters. Unescaped trailing spaces
    /// are dropped.
    ///
    /// ```
    /// use filters::{FilterAction, FilterRule};
    ///
    /// let rule = FilterRule::from_ignore_line("!keep.log").expect("rule");
    /// assert_eq!(rule.action(), FilterAction::Include);
    /// assert!(FilterRule::from_ignore_line("# comment").is_none());
    /// ```
    #[must_use]
    pub fn from_ignore_line(line: &str) -> Option<Self> {
        let line = trim_trailing_spaces(line.trim_end_matches(['\r', '\n']));
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (action, body) = match line.strip_prefix('!') {
            Some(rest) => (FilterAction::Include, rest),
            None => (FilterAction::Exclude, line),
        };
        if body.is_empty() {
            return None;
        }
        Some(Self::with_action(action, body.to_owned()))
    }

    /// Returns the rule action.
    #[must_use]
    pub const fn action(&self) -> FilterAction {
        self.action
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns whether the rule only matches directories.
    #[must_use]
    pub const fn is_directory_only(&self) -> bool {
        self.directory_only
    }

    /// Returns whether the rule is anchored to the search domain.
    #[must_use]
    pub const fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Glob expression handed to `globset`.
    pub(crate) fn glob_expression(&self) -> String {
        let body = self.pattern.trim_end_matches('/');
        let body = body.strip_prefix('/').unwrap_or(body);
        if self.anchored || body.starts_with("**") {
            body.to_owned()
        } else {
            format!("**/{body}")
        }
    }
}

fn trim_trailing_spaces(line: &str) -> &str {
    let mut end = line.len();
    while line[..end].ends_with(' ') && !line[..end - 1].ends_with('\\') {
        end -= 1;
    }
    &line[..end]
}
