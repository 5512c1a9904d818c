//! Per-file move classification.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Failure moving one candidate into the backup directory. `Vanished` is
/// informational (the file was removed out-of-band after enumeration);
/// `Rename` carries the underlying I/O cause.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("file no longer exists (moved out-of-band?)")]
    Vanished,
    #[error("rename failed: {0}")]
    Rename(#[source] io::Error),
}

/// Move `src` into the backup directory at `dst`, preserving the basename.
/// A source that is already gone is reported as `Vanished`, not as an error
/// the batch should count against itself.
pub fn move_to_backup(src: &Path, dst: &Path) -> Result<(), MoveError> {
    match std::fs::rename(src, dst) {
        Ok(()) => Ok(()),
        // NotFound can also mean a missing destination parent; only call it
        // vanished when the source is truly gone.
        Err(e) if e.kind() == io::ErrorKind::NotFound && !src.exists() => Err(MoveError::Vanished),
        Err(e) => Err(MoveError::Rename(e)),
    }
}
