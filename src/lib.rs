// Library module for foldersync
// Re-exports modules for use in integration tests and the binary

pub mod fs;
pub mod logging;
pub mod sync;
