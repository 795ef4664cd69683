use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};

/// What happened to a watched path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    /// A file appeared.
    Add,
    /// A file's contents changed.
    Change,
    /// A file disappeared.
    Unlink,
    /// A directory disappeared.
    UnlinkDir,
}

/// One filesystem change, mapped to exactly one upload or delete.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WatchEvent {
    /// Kind of change.
    pub kind: WatchEventKind,
    /// Absolute local path.
    pub path: PathBuf,
}

impl WatchEvent {
    /// Creates an event.
    pub fn new(kind: WatchEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// A file appeared.
    pub fn add(path: impl Into<PathBuf>) -> Self {
        Self::new(WatchEventKind::Add, path)
    }

    /// A file changed.
    pub fn change(path: impl Into<PathBuf>) -> Self {
        Self::new(WatchEventKind::Change, path)
    }

    /// A file disappeared.
    pub fn unlink(path: impl Into<PathBuf>) -> Self {
        Self::new(WatchEventKind::Unlink, path)
    }

    /// A directory disappeared.
    pub fn unlink_dir(path: impl Into<PathBuf>) -> Self {
        Self::new(WatchEventKind::UnlinkDir, path)
    }

    /// Returns `true` for add and change events.
    pub fn is_upload(&self) -> bool {
        matches!(self.kind, WatchEventKind::Add | WatchEventKind::Change)
    }

    /// Maps a raw observer event.
    ///
    /// Renames become an unlink of the old path and an add of the new one.
    /// Directory creation, metadata-only changes and access events produce
    /// nothing.
    pub fn from_notify(event: &Event) -> Vec<Self> {
        match event.kind {
            EventKind::Create(CreateKind::Folder) => Vec::new(),
            EventKind::Create(_) => files_only(&event.paths, WatchEventKind::Add),
            EventKind::Modify(ModifyKind::Name(mode)) => renamed(mode, &event.paths),
            EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
            EventKind::Modify(_) => files_only(&event.paths, WatchEventKind::Change),
            EventKind::Remove(RemoveKind::Folder) => event
                .paths
                .iter()
                .map(|path| Self::unlink_dir(path.clone()))
                .collect(),
            EventKind::Remove(_) => event
                .paths
                .iter()
                .map(|path| Self::unlink(path.clone()))
                .collect(),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
        }
    }
}

fn files_only(targets: &[PathBuf], kind: WatchEventKind) -> Vec<WatchEvent> {
    targets
        .iter()
        .filter(|path| !path.is_dir())
        .map(|path| WatchEvent::new(kind, path.clone()))
        .collect()
}

fn renamed(mode: RenameMode, targets: &[PathBuf]) -> Vec<WatchEvent> {
    match (mode, targets) {
        (RenameMode::From, _) => targets.iter().map(|path| gone(path)).collect(),
        (RenameMode::To, _) => files_only(targets, WatchEventKind::Add),
        (RenameMode::Both, [from, to]) => {
            let mut events = vec![gone(from)];
            events.extend(files_only(std::slice::from_ref(to), WatchEventKind::Add));
            events
        }
        _ => targets
            .iter()
            .filter_map(|path| {
                if path.is_file() {
                    Some(WatchEvent::add(path.clone()))
                } else if path.exists() {
                    None
                } else {
                    Some(gone(path))
                }
            })
            .collect(),
    }
}

/// A path that moved away. Whether it was a directory can no longer be
/// checked, so folder-like names are reported as directories.
fn gone(path: &Path) -> WatchEvent {
    if paths::is_folder(&path.to_string_lossy()) {
        WatchEvent::unlink_dir(path)
    } else {
        WatchEvent::unlink(path)
    }
}
