use crate::FilterRule;

/// Patterns ignored in every context.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "fields.output.json",
    "hubspot.config.yml",
    "hubspot.config.yaml",
    "node_modules",
    ".*",
    "*.log",
    "*.swp",
    "Icon\r",
    "__MACOSX",
    "~",
    "*~",
    "Thumbs.db",
    "ehthumbs.db",
    "Desktop.ini",
    "@eaDir",
];

/// Lockfile ignored outside of a managed project.
pub const LOCKFILE_PATTERN: &str = "package-lock.json";

/// Builds the built-in exclusion rules.
pub fn default_rules(in_project: bool) -> Vec<FilterRule> {
    let mut rules: Vec<FilterRule> = DEFAULT_IGNORE_PATTERNS
        .iter()
        .map(|pattern| FilterRule::exclude(*pattern))
        .collect();
    if !in_project {
        rules.push(FilterRule::exclude(LOCKFILE_PATTERN));
    }
    rules
}
