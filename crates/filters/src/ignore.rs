//! Lazily loaded ignore rules with `.hsignore` discovery.

use std::fs;
use std::mem;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use logging::trace_filter;

use crate::{FilterSet, default_rules, parse_ignore_file};

/// File name looked up when discovering project ignore rules.
pub const IGNORE_FILE_NAME: &str = ".hsignore";

#[derive(Clone, Debug)]
enum Discovery {
    /// Walk upward from the process working directory at load time.
    WorkingDirectory,
    /// Walk upward from the given directory.
    StartAt(PathBuf),
    /// No ignore file; paths are matched relative to the given domain, or to
    /// the filesystem root when `None`.
    Fixed(Option<PathBuf>),
}

#[derive(Debug, Default)]
struct IgnoreState {
    loaded: bool,
    domain: Option<PathBuf>,
    ignore_file: Option<PathBuf>,
    rules: FilterSet,
    runtime: Vec<PathBuf>,
}

/// The sync engine's ignore decision.
///
/// Built-in exclusions, the nearest `.hsignore` above the start directory and
/// runtime-protected paths, loaded once on first use. The directory holding
/// the discovered `.hsignore` becomes the search domain and every path is
/// matched relative to it. Without a domain, paths are matched relative to
/// the filesystem root.
///
/// The rule set is shared by `Arc` between the upload scheduler and the watch
/// loop. The first query's `in_project` flag decides whether the lockfile
/// exclusion applies; later calls reuse the loaded rules.
///
/// # Examples
///
/// ```
/// use filters::IgnoreRuleSet;
/// use std::path::Path;
///
/// let rules = IgnoreRuleSet::with_domain("/work/theme");
/// assert!(rules.should_ignore(Path::new("/work/theme/node_modules/a.js"), true));
/// assert!(!rules.should_ignore(Path::new("/work/theme/css/main.css"), true));
/// ```
#[derive(Debug)]
pub struct IgnoreRuleSet {
    discovery: Discovery,
    state: RwLock<IgnoreState>,
}

impl Default for IgnoreRuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl IgnoreRuleSet {
    /// Discovers `.hsignore` from the working directory on first use.
    pub fn new() -> Self {
        Self::with_discovery(Discovery::WorkingDirectory)
    }

    /// Discovers `.hsignore` by walking upward from `start`.
    pub fn with_start_dir(start: impl Into<PathBuf>) -> Self {
        Self::with_discovery(Discovery::StartAt(start.into()))
    }

    /// Uses `domain` as the search domain without reading any ignore file.
    pub fn with_domain(domain: impl Into<PathBuf>) -> Self {
        Self::with_discovery(Discovery::Fixed(Some(normalize(&domain.into()))))
    }

    /// Uses only the built-in rules, matched relative to the filesystem root.
    pub fn without_discovery() -> Self {
        Self::with_discovery(Discovery::Fixed(None))
    }

    fn with_discovery(discovery: Discovery) -> Self {
        Self {
            discovery,
            state: RwLock::new(IgnoreState::default()),
        }
    }

    /// Returns `true` if `path` must not be synced.
    ///
    /// The final component is treated as a file unless the path ends with a
    /// separator; use [`should_ignore_dir`](Self::should_ignore_dir) for
    /// directories.
    pub fn should_ignore(&self, path: &Path, in_project: bool) -> bool {
        let is_dir = path
            .as_os_str()
            .to_string_lossy()
            .ends_with(std::path::is_separator);
        self.decide(path, is_dir, in_project)
    }

    /// Returns `true` if the directory at `path` and everything below it must
    /// not be synced.
    pub fn should_ignore_dir(&self, path: &Path, in_project: bool) -> bool {
        self.decide(path, true, in_project)
    }

    /// Protects `path` (and anything below it) from syncing without touching
    /// the ignore file.
    pub fn add_runtime_pattern(&self, path: &Path) {
        let absolute = self.absolutize(path);
        trace_filter!(path = %absolute.display(), "added runtime ignore path");
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.runtime.contains(&absolute) {
            state.runtime.push(absolute);
        }
    }

    /// Loads the rules now. Later calls are no-ops.
    pub fn load(&self, in_project: bool) {
        self.with_loaded(in_project, |_| ());
    }

    /// Directory of the discovered `.hsignore` (or the fixed domain).
    pub fn search_domain(&self) -> Option<PathBuf> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .domain
            .clone()
    }

    /// Path of the discovered `.hsignore`, if any.
    pub fn ignore_file(&self) -> Option<PathBuf> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .ignore_file
            .clone()
    }

    fn decide(&self, path: &Path, is_dir: bool, in_project: bool) -> bool {
        let absolute = self.absolutize(path);
        self.with_loaded(in_project, |state| {
            let relative = match &state.domain {
                Some(domain) => absolute.strip_prefix(domain).unwrap_or(&absolute),
                None => absolute.as_path(),
            };
            if relative.as_os_str().is_empty() {
                return false;
            }
            if state
                .runtime
                .iter()
                .any(|protected| absolute.starts_with(protected))
            {
                return true;
            }
            state.rules.is_ignored(relative, is_dir)
        })
    }

    fn with_loaded<R>(&self, in_project: bool, f: impl FnOnce(&IgnoreState) -> R) -> R {
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if state.loaded {
                return f(&state);
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.loaded {
            let runtime = mem::take(&mut state.runtime);
            *state = self.load_state(in_project);
            state.runtime = runtime;
        }
        f(&state)
    }

    fn load_state(&self, in_project: bool) -> IgnoreState {
        let mut rules = default_rules(in_project);
        let (domain, ignore_file) = match &self.discovery {
            Discovery::WorkingDirectory => match std::env::current_dir() {
                Ok(cwd) => discover(&cwd),
                Err(error) => {
                    tracing::warn!(
                        target: "hsync::filter",
                        "cannot read working directory, skipping {IGNORE_FILE_NAME} lookup: {error}"
                    );
                    (None, None)
                }
            },
            Discovery::StartAt(start) => discover(&normalize(start)),
            Discovery::Fixed(domain) => (domain.clone(), None),
        };

        if let Some(file) = &ignore_file {
            match fs::read_to_string(file) {
                Ok(contents) => rules.extend(parse_ignore_file(&contents)),
                Err(error) => tracing::warn!(
                    target: "hsync::filter",
                    "ignoring unreadable {}: {error}",
                    file.display()
                ),
            }
        }

        let (rules, errors) = FilterSet::from_rules_skipping_invalid(rules);
        for error in errors {
            tracing::warn!(
                target: "hsync::filter",
                pattern = error.pattern(),
                "skipping invalid ignore pattern: {error}"
            );
        }
        trace_filter!(
            rules = rules.len(),
            domain = ?domain,
            "loaded ignore rules"
        );

        IgnoreState {
            loaded: true,
            domain,
            ignore_file,
            rules,
            runtime: Vec::new(),
        }
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return normalize(path);
        }
        let base = match &self.discovery {
            Discovery::StartAt(start) => Some(start.clone()),
            Discovery::Fixed(Some(domain)) => Some(domain.clone()),
            Discovery::WorkingDirectory | Discovery::Fixed(None) => std::env::current_dir().ok(),
        };
        match base {
            Some(base) => normalize(&base.join(path)),
            None => normalize(path),
        }
    }
}

fn discover(start: &Path) -> (Option<PathBuf>, Option<PathBuf>) {
    start
        .ancestors()
        .map(|dir| dir.join(IGNORE_FILE_NAME))
        .find(|candidate| candidate.is_file())
        .map_or((None, None), |file| {
            (file.parent().map(Path::to_path_buf), Some(file))
        })
}

/// Resolves `.` and `..` lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
