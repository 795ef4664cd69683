use crate::FilterRule;

/// Parses the contents of an ignore file into rules, in file order.
///
/// ```
/// use filters::parse_ignore_file;
///
/// let rules = parse_ignore_file("# build output\ndist/\n\n*.log\n!keep.log\n");
/// assert_eq!(rules.len(), 3);
/// assert!(rules[0].is_directory_only());
/// ```
pub fn parse_ignore_file(contents: &str) -> Vec<FilterRule> {
    contents
        .lines()
        .filter_map(FilterRule::from_ignore_line)
        .collect()
}
