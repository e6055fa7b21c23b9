// Error types for mirror passes
// Every variant carries the path it concerns

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for synchronization
#[derive(Debug)]
pub enum SyncError {
    /// Setup errors
    SourceNotFound { path: PathBuf },
    SourceNotDirectory { path: PathBuf },
    NestedTrees { source: PathBuf, replica: PathBuf },
    ReplicaRootUnavailable { path: PathBuf, source: io::Error },

    /// Per-entry errors
    Io { path: PathBuf, operation: String, source: io::Error },
    KindMismatch { path: PathBuf, expected: &'static str },
    Walk { path: Option<PathBuf>, reason: String },

    /// Configuration errors
    InvalidChunkSize { size: usize },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyncError::SourceNotFound { path } => {
                write!(f, "Source folder {} does not exist.", path.display())
            }
            SyncError::SourceNotDirectory { path } => {
                write!(f, "Source folder {} is not a directory.", path.display())
            }
            SyncError::NestedTrees { source, replica } => write!(
                f,
                "Source {} and replica {} must not be the same folder or contain one another",
                source.display(),
                replica.display()
            ),
            SyncError::ReplicaRootUnavailable { path, source } => {
                write!(f, "Failed to create replica directory {}: {}", path.display(), source)
            }
            SyncError::Io { path, operation, source } => {
                write!(f, "I/O error while {} {}: {}", operation, path.display(), source)
            }
            SyncError::KindMismatch { path, expected } => write!(
                f,
                "Replica entry {} is in the way: expected a {}, it will be pruned",
                path.display(),
                expected
            ),
            SyncError::Walk { path, reason } => match path {
                Some(p) => write!(f, "Failed to walk {}: {}", p.display(), reason),
                None => write!(f, "Failed to walk tree: {}", reason),
            },
            SyncError::InvalidChunkSize { size } => {
                write!(f, "Invalid chunk size: {} (must be greater than zero)", size)
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::ReplicaRootUnavailable { source, .. } => Some(source),
            SyncError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl SyncError {
    /// Wrap an io::Error with the operation and path it occurred on
    pub fn io(err: io::Error, operation: &str, path: impl Into<PathBuf>) -> Self {
        SyncError::Io {
            path: path.into(),
            operation: operation.to_string(),
            source: err,
        }
    }
}

/// Classify an io::Error as "the path is not there"
pub fn is_missing(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory)
}

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
