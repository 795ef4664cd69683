use crate::extension::{FUNCTIONS_EXTENSION, MODULE_EXTENSION, extension};

/// Remote folder that holds the platform's read-only default assets.
pub const DEFAULT_CONTENT_ROOT: &str = "/@hubspot";

/// Nature of a path as understood by the file mapper API.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PathKind {
    /// The account root (`/`, `\` or an empty string).
    Root,
    /// A folder carrying the reserved `.module` suffix.
    Module,
    /// A path with a file extension.
    File,
    /// Any other folder, including `.functions` folders.
    Folder,
}

impl PathKind {
    /// Returns `true` for every kind except [`PathKind::File`].
    #[must_use]
    pub const fn is_folder_like(self) -> bool {
        !matches!(self, Self::File)
    }
}

/// Classifies `path`. Root and module detection win over file detection.
pub fn classify(path: &str) -> PathKind {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed == "/" || trimmed == "\\" {
        return PathKind::Root;
    }
    let ext = extension(trimmed);
    if ext == MODULE_EXTENSION {
        PathKind::Module
    } else if ext.is_empty() || ext == FUNCTIONS_EXTENSION {
        PathKind::Folder
    } else {
        PathKind::File
    }
}

/// Returns `true` for the account root.
pub fn is_root(path: &str) -> bool {
    classify(path) == PathKind::Root
}

/// Returns `true` when the final component is a `.module` folder.
pub fn is_module_folder(path: &str) -> bool {
    classify(path) == PathKind::Module
}

/// Returns `true` when the path names a file.
pub fn is_file(path: &str) -> bool {
    classify(path) == PathKind::File
}

/// Returns `true` when the path names a folder of any kind.
pub fn is_folder(path: &str) -> bool {
    classify(path).is_folder_like()
}

/// Returns `true` for the default-content folder and anything below it.
pub fn is_default_content(path: &str) -> bool {
    let trimmed = path.trim().replace('\\', "/").to_ascii_lowercase();
    trimmed == DEFAULT_CONTENT_ROOT
        || trimmed
            .strip_prefix(DEFAULT_CONTENT_ROOT)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Returns `true` when some ancestor folder of `path` is a module folder.
///
/// The final component is not considered, so `cards.module` itself is not a
/// module child while `cards.module/module.html` is.
pub fn is_module_child(path: &str) -> bool {
    let trimmed = path.trim().trim_end_matches(['/', '\\']);
    let mut components: Vec<&str> = trimmed
        .split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .collect();
    components.pop();
    components
        .iter()
        .any(|component| extension(component) == MODULE_EXTENSION)
}
