//! Remote path helpers.
//!
//! Remote paths always use `/` separators regardless of the host platform.

use std::path::Path;

/// Converts a local path into a forward-slash remote path.
pub fn to_remote_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Joins `relative` onto `base`, collapsing duplicate separators.
///
/// An empty `base` yields `relative` unchanged (modulo separators), and an
/// empty `relative` yields `base`.
pub fn remote_join(base: &str, relative: &str) -> String {
    let base = base.trim().replace('\\', "/");
    let relative = relative.trim().replace('\\', "/");
    let relative = relative.trim_start_matches('/');

    if relative.is_empty() {
        return base;
    }
    if base.is_empty() {
        return relative.to_owned();
    }
    format!("{}/{}", base.trim_end_matches('/'), relative)
}

/// Returns the parent folder of a remote path, or an empty string.
pub fn remote_dirname(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    match path.rfind('/') {
        Some(0) => "/",
        Some(index) => &path[..index],
        None => "",
    }
}

/// Returns the final component of a remote path.
pub fn remote_basename(path: &str) -> &str {
    let path = path.trim_end_matches(['/', '\\']);
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Replaces the final component of `path` with `name`.
pub fn remote_sibling(path: &str, name: &str) -> String {
    remote_join(remote_dirname(path), name)
}
