//! Directory reconciliation: every source directory gets a replica twin.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::fs::{EntryKind, TreeWalker};
use crate::sync::engine::{report, SyncStats};
use crate::sync::error::{is_missing, Result, SyncError};
use crate::sync::exclude::ExcludePatterns;

/// Create each directory of `source` under `replica` if it is missing.
///
/// Never touches files and never deletes. A replica entry of the wrong kind
/// is reported and left for the pruner.
pub fn reconcile_directories(
    source: &Path,
    replica: &Path,
    exclude: &ExcludePatterns,
    stats: &mut SyncStats,
) {
    let walker = TreeWalker::source(source);

    for item in walker.top_down() {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                report(stats, err);
                continue;
            }
        };

        if entry.kind != EntryKind::Dir || exclude.is_excluded(&entry.key()) {
            continue;
        }

        if let Err(err) = check_replica_parents(replica, &entry.relative) {
            report(stats, err);
            continue;
        }

        let target = replica.join(&entry.relative);
        match fs::symlink_metadata(&target) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => report(
                stats,
                SyncError::KindMismatch {
                    path: target,
                    expected: EntryKind::Dir.describe(),
                },
            ),
            Err(err) if is_missing(&err) => match fs::create_dir_all(&target) {
                Ok(()) => {
                    info!("Directory created: {}", target.display());
                    stats.dirs_created += 1;
                }
                Err(err) => report(stats, SyncError::io(err, "creating directory", &target)),
            },
            Err(err) => report(stats, SyncError::io(err, "inspecting", &target)),
        }
    }
}

/// Check that every existing ancestor of `relative` below the replica root is
/// a real directory. A symlink or file there would send writes outside the
/// replica, so the entry is reported as a mismatch and left for the pruner.
pub(crate) fn check_replica_parents(replica: &Path, relative: &Path) -> Result<()> {
    let Some(parents) = relative.parent() else {
        return Ok(());
    };

    let mut current = replica.to_path_buf();
    for component in parents.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(SyncError::KindMismatch {
                    path: current,
                    expected: EntryKind::Dir.describe(),
                });
            }
            // Nothing exists below a missing ancestor
            Err(err) if is_missing(&err) => return Ok(()),
            Err(err) => return Err(SyncError::io(err, "inspecting", &current)),
        }
    }

    Ok(())
}
