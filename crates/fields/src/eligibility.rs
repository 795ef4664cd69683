use std::path::Path;

use crate::ConvertOptions;

/// Source names the converter accepts.
pub const CONVERTIBLE_FILE_NAMES: [&str; 3] = ["fields.js", "fields.mjs", "fields.cjs"];

/// Name of the produced document, both locally and on the remote side.
pub const OUTPUT_FILE_NAME: &str = "fields.json";

/// Name used when a produced document is saved back into the project.
pub const SAVED_OUTPUT_FILE_NAME: &str = "fields.output.json";

/// Returns `true` when the final component is a convertible source name.
pub fn is_convertible_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| CONVERTIBLE_FILE_NAMES.contains(&name))
}

/// Decides whether `path` goes through the converter.
///
/// Conversion must be enabled, the name must be convertible, and the file
/// must sit at `project_root` or directly inside a module folder that is not
/// itself nested in another module folder.
///
/// ```
/// use fields::{ConvertOptions, is_convertible};
/// use std::path::Path;
///
/// let root = Path::new("/work/theme");
/// let options = ConvertOptions::enabled();
/// assert!(is_convertible(root, Path::new("/work/theme/fields.js"), &options));
/// assert!(is_convertible(root, Path::new("/work/theme/modules/card.module/fields.mjs"), &options));
/// assert!(!is_convertible(root, Path::new("/work/theme/modules/fields.js"), &options));
/// ```
pub fn is_convertible(project_root: &Path, path: &Path, options: &ConvertOptions) -> bool {
    if !options.enabled || !is_convertible_name(path) {
        return false;
    }
    let Some(relative_dir) = path
        .parent()
        .and_then(|parent| parent.strip_prefix(project_root).ok())
    else {
        return false;
    };
    if relative_dir.as_os_str().is_empty() {
        return true;
    }
    let relative_dir = paths::to_remote_path(relative_dir);
    paths::is_module_folder(&relative_dir) && !paths::is_module_child(&relative_dir)
}
