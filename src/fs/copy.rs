//! Chunked file copy for local-to-local transfers.
//!
//! Files are streamed through a single fixed-size buffer, so memory use does
//! not depend on file size.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::sync::error::{Result, SyncError};

/// Default transfer buffer size (1 MiB).
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Copy `src` over `dst` in chunks of `chunk_size` bytes.
///
/// The destination is created or truncated before the first chunk is written.
/// Returns the number of bytes copied. A failure part way through may leave
/// a truncated destination behind.
pub fn copy_file_chunked(src: &Path, dst: &Path, chunk_size: usize) -> Result<u64> {
    if chunk_size == 0 {
        return Err(SyncError::InvalidChunkSize { size: chunk_size });
    }

    let mut reader = File::open(src).map_err(|e| SyncError::io(e, "opening", src))?;
    let mut writer = File::create(dst).map_err(|e| SyncError::io(e, "creating", dst))?;

    let mut buffer = vec![0u8; chunk_size];
    let mut copied = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SyncError::io(e, "reading", src)),
        };

        writer
            .write_all(&buffer[..n])
            .map_err(|e| SyncError::io(e, "writing", dst))?;
        copied += n as u64;
    }

    writer.flush().map_err(|e| SyncError::io(e, "flushing", dst))?;

    Ok(copied)
}
