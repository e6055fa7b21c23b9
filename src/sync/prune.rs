//! Pruning: remove replica entries that no longer exist in the source.
//!
//! The replica is walked bottom-up so that children are judged before their
//! parent directory. A directory without a source counterpart is removed
//! recursively; anything already gone by the time we get to it is fine.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::fs::{EntryKind, TreeEntry, TreeWalker};
use crate::sync::engine::{report, SyncStats};
use crate::sync::error::{is_missing, SyncError};
use crate::sync::exclude::ExcludePatterns;

/// Delete every replica entry without a same-kind counterpart in `source`.
pub fn prune_replica(source: &Path, replica: &Path, exclude: &ExcludePatterns, stats: &mut SyncStats) {
    let walker = TreeWalker::replica(replica);

    for item in walker.bottom_up() {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                report(stats, err);
                continue;
            }
        };

        if exclude.is_excluded(&entry.key()) {
            continue;
        }

        let counterpart = source.join(&entry.relative);
        let has_counterpart = match fs::metadata(&counterpart) {
            Ok(meta) => match entry.kind {
                EntryKind::File => meta.is_file(),
                EntryKind::Dir => meta.is_dir(),
                EntryKind::Other => false,
            },
            Err(err) if is_missing(&err) => false,
            Err(err) => {
                // Unknown is not absent: keep the replica entry
                report(stats, SyncError::io(err, "inspecting", &counterpart));
                true
            }
        };

        if !has_counterpart {
            remove_entry(&entry, !exclude.is_empty(), stats);
        }
    }
}

fn remove_entry(entry: &TreeEntry, protect_excluded: bool, stats: &mut SyncStats) {
    let result = match entry.kind {
        // Excluded children may still live below; only drop the directory once empty
        EntryKind::Dir if protect_excluded => fs::remove_dir(&entry.path),
        EntryKind::Dir => fs::remove_dir_all(&entry.path),
        EntryKind::File | EntryKind::Other => fs::remove_file(&entry.path),
    };

    match result {
        Ok(()) if entry.kind == EntryKind::Dir => {
            info!("Directory removed: {}", entry.path.display());
            stats.dirs_removed += 1;
        }
        Ok(()) => {
            info!("File removed: {}", entry.path.display());
            stats.files_removed += 1;
        }
        Err(err) if is_missing(&err) => {
            debug!("Already gone: {}", entry.path.display());
        }
        Err(err) if err.kind() == io::ErrorKind::DirectoryNotEmpty && protect_excluded => {
            debug!("Keeping {}: it still holds excluded entries", entry.path.display());
        }
        Err(err) => report(stats, SyncError::io(err, "removing", &entry.path)),
    }
}
