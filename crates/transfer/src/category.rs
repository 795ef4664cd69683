use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Upload category, declared in submission priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileCategory {
    /// Miscellaneous assets outside module folders (images, fonts, ...).
    Other,
    /// Anything inside a module folder.
    Module,
    /// Stylesheets and scripts.
    CssAndJs,
    /// HTML templates.
    Template,
    /// JSON documents, including converted fields documents.
    Json,
}

impl FileCategory {
    /// Every category in submission order.
    pub const ORDER: [Self; 5] = [
        Self::Other,
        Self::Module,
        Self::CssAndJs,
        Self::Template,
        Self::Json,
    ];

    /// Categorizes a path relative to the upload root.
    pub fn of(relative: &Path) -> Self {
        let remote = paths::to_remote_path(relative);
        if paths::is_module_child(&remote) {
            return Self::Module;
        }
        match paths::extension(&remote).as_str() {
            "css" | "js" => Self::CssAndJs,
            "html" => Self::Template,
            "json" => Self::Json,
            _ => Self::Other,
        }
    }

    /// Short label used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Other => "other",
            Self::Module => "module",
            Self::CssAndJs => "css-and-js",
            Self::Template => "template",
            Self::Json => "json",
        }
    }
}

/// Files grouped by [`FileCategory`], each group keeping input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    groups: BTreeMap<FileCategory, Vec<PathBuf>>,
}

impl Partition {
    /// Files in `category`.
    pub fn files(&self, category: FileCategory) -> &[PathBuf] {
        self.groups.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Groups in submission order, skipping empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (FileCategory, &[PathBuf])> {
        self.groups
            .iter()
            .map(|(category, files)| (*category, files.as_slice()))
    }

    /// Every file in submission order.
    pub fn flatten(&self) -> Vec<PathBuf> {
        self.groups.values().flatten().cloned().collect()
    }

    /// Total number of files.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Returns `true` when there are no files.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions `files` by category relative to `root`.
///
/// Files outside `root` are categorized by their full path.
pub fn partition<P: AsRef<Path>>(root: &Path, files: &[P]) -> Partition {
    let mut groups: BTreeMap<FileCategory, Vec<PathBuf>> = BTreeMap::new();
    for file in files {
        let file = file.as_ref();
        let relative = file.strip_prefix(root).unwrap_or(file);
        groups
            .entry(FileCategory::of(relative))
            .or_default()
            .push(file.to_path_buf());
    }
    Partition { groups }
}
