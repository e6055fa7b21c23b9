//! File reconciliation: copy missing files, re-copy files whose source is newer.
//!
//! Change detection is modification time only. Equal timestamps never
//! trigger a copy, so two writes within one timestamp tick can leave the
//! replica behind until the source is touched again.

use std::fs::{self, Metadata};
use std::path::Path;
use std::time::SystemTime;

use tracing::info;

use crate::fs::{copy_file_chunked, EntryKind, TreeEntry, TreeWalker};
use crate::sync::dirs::check_replica_parents;
use crate::sync::engine::{report, SyncConfig, SyncStats};
use crate::sync::error::{is_missing, Result, SyncError};

/// What to do with one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileAction {
    Copy,
    Update,
    Skip,
}

/// Copy every source file that is absent from the replica or strictly newer
/// than its replica copy. Does not create directories or delete anything.
pub fn reconcile_files(source: &Path, replica: &Path, config: &SyncConfig, stats: &mut SyncStats) {
    let walker = TreeWalker::source(source);

    for item in walker.top_down() {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                report(stats, err);
                continue;
            }
        };

        if entry.kind != EntryKind::File || config.exclude.is_excluded(&entry.key()) {
            continue;
        }

        if let Err(err) = reconcile_file(&entry, replica, config.chunk_size, stats) {
            report(stats, err);
        }
    }
}

fn reconcile_file(entry: &TreeEntry, replica: &Path, chunk_size: usize, stats: &mut SyncStats) -> Result<()> {
    let target = replica.join(&entry.relative);

    match plan(entry, replica, &target)? {
        FileAction::Copy => {
            let bytes = copy_file_chunked(&entry.path, &target, chunk_size)?;
            info!("File copied: {} -> {}", entry.path.display(), target.display());
            stats.files_copied += 1;
            stats.bytes_copied += bytes;
        }
        FileAction::Update => {
            let bytes = copy_file_chunked(&entry.path, &target, chunk_size)?;
            info!("File updated: {} -> {}", entry.path.display(), target.display());
            stats.files_updated += 1;
            stats.bytes_copied += bytes;
        }
        FileAction::Skip => {}
    }

    Ok(())
}

fn plan(entry: &TreeEntry, replica: &Path, target: &Path) -> Result<FileAction> {
    // symlink_metadata: never write through a link planted in the replica,
    // neither at the target nor at any of its parents
    check_replica_parents(replica, &entry.relative)?;
    let replica_meta = match fs::symlink_metadata(target) {
        Ok(meta) => meta,
        Err(err) if is_missing(&err) => return Ok(FileAction::Copy),
        Err(err) => return Err(SyncError::io(err, "inspecting", target)),
    };

    if !replica_meta.is_file() {
        return Err(SyncError::KindMismatch {
            path: target.to_path_buf(),
            expected: EntryKind::File.describe(),
        });
    }

    let source_meta = fs::metadata(&entry.path).map_err(|e| SyncError::io(e, "inspecting", &entry.path))?;
    let source_time = modified(&source_meta, &entry.path)?;
    let replica_time = modified(&replica_meta, target)?;

    if is_newer(source_time, replica_time) {
        Ok(FileAction::Update)
    } else {
        Ok(FileAction::Skip)
    }
}

fn modified(meta: &Metadata, path: &Path) -> Result<SystemTime> {
    meta.modified()
        .map_err(|e| SyncError::io(e, "reading modification time of", path))
}

/// Strictly newer; equal timestamps are not a change.
fn is_newer(source: SystemTime, replica: SystemTime) -> bool {
    source > replica
}
