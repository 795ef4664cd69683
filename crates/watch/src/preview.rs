use std::path::Path;

use remote::Environment;
use url::Url;

/// File whose presence marks a theme root.
pub const THEME_MARKER: &str = "theme.json";

/// Name of the theme `path` belongs to.
///
/// The nearest directory between `path` and `local_root` (inclusive) that
/// contains `theme.json` names the theme.
pub fn find_theme_name(local_root: &Path, path: &Path) -> Option<String> {
    path.ancestors()
        .skip(1)
        .take_while(|dir| dir.starts_with(local_root))
        .find(|dir| dir.join(THEME_MARKER).is_file())
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
}

/// Theme previewer address for `theme` in `account_id`.
pub fn theme_preview_url(
    account_id: u64,
    environment: Environment,
    theme: &str,
) -> Result<Url, url::ParseError> {
    let host = match environment {
        Environment::Prod => "app.hubspot.com",
        Environment::Qa => "app.hubspotqa.com",
    };
    let mut url = Url::parse(&format!("https://{host}/theme-previewer/{account_id}/edit/"))?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(theme);
    }
    Ok(url)
}
