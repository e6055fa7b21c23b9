//! Sync engine for one-way mirroring.
//!
//! A pass runs three steps in a fixed order: directory reconciliation,
//! file reconciliation, then pruning. Per-entry failures are logged and
//! counted; only a missing source root or an uncreatable replica root
//! aborts a pass.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::fs::CHUNK_SIZE;
use crate::sync::dirs::reconcile_directories;
use crate::sync::error::{Result, SyncError};
use crate::sync::exclude::ExcludePatterns;
use crate::sync::files::reconcile_files;
use crate::sync::prune::prune_replica;

/// Sync configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Transfer buffer size for file copies.
    pub chunk_size: usize,
    /// Paths left untouched on both sides.
    pub exclude: ExcludePatterns,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            exclude: ExcludePatterns::new(),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SyncError::InvalidChunkSize { size: self.chunk_size });
        }
        Ok(())
    }
}

/// Sync statistics for a single pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Directories created in the replica.
    pub dirs_created: usize,
    /// Files copied because the replica had none.
    pub files_copied: usize,
    /// Files re-copied because the source was newer.
    pub files_updated: usize,
    /// Replica files removed.
    pub files_removed: usize,
    /// Replica directories removed (with their contents).
    pub dirs_removed: usize,
    /// Bytes written to the replica.
    pub bytes_copied: u64,
    /// Per-entry failures that were logged and skipped.
    pub errors: usize,
    /// Wall time of the pass.
    pub duration: Duration,
}

impl SyncStats {
    /// Number of operations that changed the replica.
    pub fn mutations(&self) -> usize {
        self.dirs_created
            + self.files_copied
            + self.files_updated
            + self.files_removed
            + self.dirs_removed
    }

    pub fn is_clean(&self) -> bool {
        self.mutations() == 0 && self.errors == 0
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} dirs created, {} files copied, {} updated ({}), {} files and {} dirs removed, {} errors in {:.2}s",
            self.dirs_created,
            self.files_copied,
            self.files_updated,
            humansize::format_size(self.bytes_copied, humansize::BINARY),
            self.files_removed,
            self.dirs_removed,
            self.errors,
            self.duration.as_secs_f64()
        )
    }
}

/// Log a per-entry failure and count it.
pub(crate) fn report(stats: &mut SyncStats, err: SyncError) {
    error!("{}", err);
    stats.errors += 1;
}

/// Sync engine bound to one source and one replica root.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    source: PathBuf,
    replica: PathBuf,
    config: SyncConfig,
}

impl SyncEngine {
    /// Create a new sync engine.
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>, config: SyncConfig) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            config,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    /// Startup checks: valid configuration, source is a directory, and the
    /// two roots do not overlap (a replica inside the source would be
    /// mirrored into itself; a source inside the replica would be pruned).
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        self.check_source()?;

        let source = resolve(&self.source);
        let replica = resolve(&self.replica);
        if replica.starts_with(&source) || source.starts_with(&replica) {
            return Err(SyncError::NestedTrees {
                source: self.source.clone(),
                replica: self.replica.clone(),
            });
        }

        Ok(())
    }

    /// Run one full pass.
    pub fn synchronize(&self) -> Result<SyncStats> {
        let started = Instant::now();

        // A vanished source would otherwise look like "delete everything"
        self.check_source()?;
        self.ensure_replica_root()?;

        let mut stats = SyncStats::default();
        reconcile_directories(&self.source, &self.replica, &self.config.exclude, &mut stats);
        reconcile_files(&self.source, &self.replica, &self.config, &mut stats);
        prune_replica(&self.source, &self.replica, &self.config.exclude, &mut stats);

        stats.duration = started.elapsed();
        Ok(stats)
    }

    fn check_source(&self) -> Result<()> {
        match fs::metadata(&self.source) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(SyncError::SourceNotDirectory { path: self.source.clone() }),
            Err(_) => Err(SyncError::SourceNotFound { path: self.source.clone() }),
        }
    }

    fn ensure_replica_root(&self) -> Result<()> {
        if self.replica.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(&self.replica).map_err(|source| SyncError::ReplicaRootUnavailable {
            path: self.replica.clone(),
            source,
        })?;
        info!("Replica directory created: {}", self.replica.display());
        Ok(())
    }
}

/// Absolute, symlink-free form of a path that may not exist yet: the deepest
/// existing ancestor is canonicalized and the missing tail re-appended.
fn resolve(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut tail = Vec::new();
    let mut cursor = absolute.as_path();
    loop {
        if let Ok(canonical) = cursor.canonicalize() {
            return tail.iter().rev().fold(canonical, |acc, name| acc.join(name));
        }
        match (cursor.parent(), cursor.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                cursor = parent;
            }
            _ => return absolute,
        }
    }
}
