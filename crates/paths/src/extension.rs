/// Extension reserved for module folders (`cards.module/`).
pub const MODULE_EXTENSION: &str = "module";

/// Extension reserved for serverless function folders (`api.functions/`).
pub const FUNCTIONS_EXTENSION: &str = "functions";

/// Extensions the file mapper API accepts for individual files.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "css", "js", "json", "html", "txt", "md", "jpg", "jpeg", "png", "gif", "map", "svg", "ttf",
    "woff", "woff2", "eot", "zip", "graphql",
];

/// Returns the lower-cased extension of the final path component without the
/// leading dot.
///
/// Trailing separators are ignored so `cards.module/` reports `module`. A
/// leading dot on the final component (`.hsignore`) is not an extension.
pub fn extension(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches(['/', '\\']);
    let name = trimmed.rsplit(['/', '\\']).next().unwrap_or_default();
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(dot) => name[dot + 1..].trim().to_ascii_lowercase(),
    }
}

/// Returns `true` when the path's extension is on [`ALLOWED_EXTENSIONS`].
pub fn is_allowed_extension(path: &str) -> bool {
    let ext = extension(path);
    !ext.is_empty() && ALLOWED_EXTENSIONS.contains(&ext.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_without_dot() {
        assert_eq!(extension("main.CSS"), "css");
        assert_eq!(extension("dir/archive.tar.gz"), "gz");
    }

    #[test]
    fn dotfiles_have_no_extension() {
        assert_eq!(extension(".hsignore"), "");
        assert_eq!(extension("theme/.env"), "");
    }

    #[test]
    fn trailing_separator_is_ignored() {
        assert_eq!(extension("theme/cards.module/"), "module");
        assert_eq!(extension("theme\\cards.module\\"), "module");
    }

    #[test]
    fn dots_in_parent_directories_do_not_count() {
        assert_eq!(extension("my.theme/templates"), "");
    }

    #[test]
    fn trailing_dot_yields_empty_extension() {
        assert_eq!(extension("notes."), "");
    }

    #[test]
    fn allow_list_accepts_known_assets_only() {
        assert!(is_allowed_extension("css/main.css"));
        assert!(is_allowed_extension("images/logo.PNG"));
        assert!(!is_allowed_extension("scripts/build.sh"));
        assert!(!is_allowed_extension("README"));
    }
}
