use std::path::{Component, Path, PathBuf};

/// What a walked path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks that are not resolved, broken links, sockets, fifos, devices.
    Other,
}

impl EntryKind {
    pub fn describe(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "directory",
            EntryKind::Other => "special file",
        }
    }
}

/// A single entry found while walking a tree root.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// Full path on disk.
    pub path: PathBuf,
    /// Path relative to the walked root; the key shared by both trees.
    pub relative: PathBuf,
    pub kind: EntryKind,
}

impl TreeEntry {
    /// Relative path with `/` separators, used for pattern matching.
    pub fn key(&self) -> String {
        relative_key(&self.relative)
    }
}

/// Render a relative path with forward slashes on every platform
pub fn relative_key(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
