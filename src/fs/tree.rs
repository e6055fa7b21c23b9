//! Sequential tree walking with relative paths.
//!
//! Walks are serial; a pass touches the filesystem from one worker
//! only. Entries come out in sorted pre-order (parents before children);
//! `bottom_up` reverses that so children come before their parents.

use jwalk::{Parallelism, WalkDir};
use std::fs;
use std::path::{Path, PathBuf};

use crate::fs::types::{EntryKind, TreeEntry};
use crate::sync::error::{Result, SyncError};

type WalkItem = std::result::Result<jwalk::DirEntry<((), ())>, jwalk::Error>;

/// Walker over everything below a tree root (the root itself is not yielded)
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    resolve_links: bool,
}

impl TreeWalker {
    /// Walker for the source side: symlinks are classified by their target.
    /// Linked directories are reported as directories but not descended into.
    pub fn source(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            resolve_links: true,
        }
    }

    /// Walker for the replica side: symlinks are reported as `EntryKind::Other`
    pub fn replica(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            resolve_links: false,
        }
    }

    /// Parents before children
    pub fn top_down(&self) -> impl Iterator<Item = Result<TreeEntry>> + '_ {
        WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false) // Dotfiles are mirrored like everything else
            .follow_links(false)
            .sort(true)
            .min_depth(1)
            .into_iter()
            .map(move |item| self.convert(item))
    }

    /// Children before parents
    pub fn bottom_up(&self) -> Vec<Result<TreeEntry>> {
        let mut entries: Vec<_> = self.top_down().collect();
        entries.reverse();
        entries
    }

    fn convert(&self, item: WalkItem) -> Result<TreeEntry> {
        let entry = item.map_err(|e| SyncError::Walk {
            path: e.path().map(Path::to_path_buf),
            reason: e.to_string(),
        })?;

        let path = entry.path();
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| SyncError::Walk {
                path: Some(path.clone()),
                reason: format!("entry is outside of {}", self.root.display()),
            })?
            .to_path_buf();

        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_symlink() && self.resolve_links {
            match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => EntryKind::Dir,
                Ok(meta) if meta.is_file() => EntryKind::File,
                _ => EntryKind::Other,
            }
        } else {
            EntryKind::Other
        };

        Ok(TreeEntry { path, relative, kind })
    }
}
