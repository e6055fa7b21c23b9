//! One-way mirroring of a source tree onto a replica tree.
//!
//! A pass creates missing directories, copies new or newer files and prunes
//! replica entries that have no source counterpart, in that order.

pub mod dirs;
pub mod engine;
pub mod error;
pub mod exclude;
pub mod files;
pub mod prune;
pub mod runner;
pub mod shutdown;

pub use dirs::reconcile_directories;
pub use engine::{SyncConfig, SyncEngine, SyncStats};
pub use error::SyncError;
pub use exclude::ExcludePatterns;
pub use files::reconcile_files;
pub use prune::prune_replica;
pub use runner::{RunSummary, SyncRunner};
pub use shutdown::spawn_signal_listener;
