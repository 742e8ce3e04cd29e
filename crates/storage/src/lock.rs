//! Exclusive build lock
//!
//! A writable index handle holds an exclusive `fs2` lock on `build.lock` in
//! the index directory for its whole lifetime. The lock is taken without
//! waiting, so a second writer fails immediately instead of queueing on the
//! LMDB write mutex. Dropping the handle closes the file and releases it.

use fs2::FileExt;
use sdfdex_core::{IndexError, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lock file name inside the index directory
pub const LOCK_FILE_NAME: &str = "build.lock";

/// Held exclusive lock on an index directory
#[derive(Debug)]
pub struct BuildLock {
    path: PathBuf,
    _file: File,
}

impl BuildLock {
    /// Try to take the lock, failing fast when another writer holds it
    pub fn acquire(index_dir: &Path) -> Result<Self> {
        let path = index_dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| IndexError::storage(format!("failed to open lock file: {}", e)))?;
        file.try_lock_exclusive()
            .map_err(|_| IndexError::WriterLocked(index_dir.to_path_buf()))?;
        debug!(target: "sdfdex::env", path = ?path, "Build lock acquired");
        Ok(Self { path, _file: file })
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
