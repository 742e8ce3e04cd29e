//! Record reader
//!
//! Turns a locator back into the record's bytes: the file id is resolved
//! through the `files` table, joined with the root directory, and exactly
//! `end - start` bytes are read from `start`.

use sdfdex_core::{FileId, IndexError, IndexHit, RecordLocator, Result};
use sdfdex_storage::IndexEnv;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Reads record bytes from the source files of an index
#[derive(Debug)]
pub struct RecordReader<'e> {
    env: &'e IndexEnv,
    root: PathBuf,
}

impl<'e> RecordReader<'e> {
    /// Reader resolving relative paths against `root`
    pub fn new<P: AsRef<Path>>(env: &'e IndexEnv, root: P) -> Self {
        Self {
            env,
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory in use
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path on disk of a file id
    pub fn file_path(&self, file_id: FileId) -> Result<PathBuf> {
        let txn = self.env.read_txn()?;
        let relative = self
            .env
            .tables()
            .file_path(&txn, file_id)?
            .ok_or(IndexError::UnknownFile(file_id))?;
        Ok(self.root.join(relative))
    }

    /// Raw bytes of a record.
    ///
    /// # Errors
    ///
    /// `UnknownFile` when the file id is not registered; an I/O error of kind
    /// `UnexpectedEof` when the file is shorter than the span.
    pub fn read(&self, locator: &RecordLocator) -> Result<Vec<u8>> {
        let path = self.file_path(locator.file_id)?;
        let mut file = File::open(&path)?;
        file.seek(SeekFrom::Start(locator.start))?;
        let len = usize::try_from(locator.len())
            .map_err(|_| IndexError::invalid_input(format!("record of {} bytes is too large", locator.len())))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Raw bytes of a resolved hit
    pub fn read_hit(&self, hit: &IndexHit) -> Result<Vec<u8>> {
        self.read(&hit.locator)
    }

    /// Record text, invalid UTF-8 replaced
    pub fn read_text(&self, locator: &RecordLocator) -> Result<String> {
        let bytes = self.read(locator)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
