//! Index environment handle and open/close logic
//!
//! An [`IndexEnv`] wraps one LMDB environment (via `heed`) and the handles of
//! its tables. It is opened in one of two modes:
//!
//! - [`IndexEnv::open_writable`]: exclusive. Takes the build lock first, so a
//!   second writer fails fast with [`IndexError::WriterLocked`].
//! - [`IndexEnv::open_read_only`]: shared. Requires an existing index whose
//!   meta entry carries the current schema version. The handle offers no write
//!   transactions.
//!
//! Handles on the same directory inside one process share a single LMDB
//! environment (see [`registry`](crate::registry)), so every handle opens it
//! with identical flags and read-only is enforced by this handle rather than
//! by `MDB_RDONLY`.
//!
//! # Snapshot isolation
//!
//! Every [`RoTxn`] is a consistent point-in-time view. Writes committed by a
//! concurrent build are invisible to it; a new transaction sees them.

use crate::lock::BuildLock;
use crate::meta::IndexMeta;
use crate::registry::{self, SharedEnv};
use crate::tables::Tables;
use heed::{Env, EnvOpenOptions, RoTxn, RwTxn};
use sdfdex_core::{IndexError, Result, DEFAULT_MAP_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Maximum number of named databases in one environment
const MAX_DBS: u32 = 16;

/// Data file LMDB creates inside the index directory
pub const DATA_FILE_NAME: &str = "data.mdb";

/// Map a heed error onto the index error hierarchy
pub fn map_heed(e: heed::Error) -> IndexError {
    match e {
        heed::Error::Io(io) => IndexError::Io(io),
        other => IndexError::storage(other),
    }
}

/// LMDB environment options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageOptions {
    /// Map size in bytes; an upper bound on index size, not an allocation
    #[serde(default = "default_map_size")]
    pub map_size: usize,
    /// Maximum number of concurrent read transactions
    #[serde(default = "default_max_readers")]
    pub max_readers: u32,
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_max_readers() -> u32 {
    126
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            map_size: default_map_size(),
            max_readers: default_max_readers(),
        }
    }
}

/// How an environment handle may be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Queries only
    ReadOnly,
    /// Exclusive builder access
    ReadWrite,
}

/// Handle on one index environment
pub struct IndexEnv {
    /// Index directory
    path: PathBuf,
    shared: Arc<SharedEnv>,
    tables: Tables,
    mode: AccessMode,
    /// Held for the lifetime of a writable handle
    _lock: Option<BuildLock>,
}

impl std::fmt::Debug for IndexEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexEnv")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .finish()
    }
}

impl IndexEnv {
    /// Open (creating if needed) an index directory for building
    ///
    /// # Errors
    ///
    /// [`IndexError::WriterLocked`] when another writable handle, in this or
    /// another process, holds the directory.
    pub fn open_writable<P: AsRef<Path>>(path: P, options: &StorageOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)?;
        let lock = BuildLock::acquire(&path)?;

        let shared = registry::acquire(&path, options)?;
        let env = &shared.env;
        let mut wtxn = env.write_txn().map_err(map_heed)?;
        let tables = Tables::create(env, &mut wtxn)?;
        let existing = match tables.meta(&wtxn) {
            Ok(meta) => meta,
            Err(IndexError::SchemaVersionMismatch { found, .. }) => {
                warn!(
                    target: "sdfdex::env",
                    found,
                    "Index was written by another schema version; a rebuild will replace it"
                );
                None
            }
            Err(e) => return Err(e),
        };
        wtxn.commit().map_err(map_heed)?;

        info!(
            target: "sdfdex::env",
            path = ?path,
            existing = existing.is_some(),
            "Opened index for writing"
        );

        Ok(Self {
            path,
            shared,
            tables,
            mode: AccessMode::ReadWrite,
            _lock: Some(lock),
        })
    }

    /// Open an existing index for queries
    ///
    /// Read-only is enforced by the handle, not by LMDB: every handle on a
    /// directory in this process shares one environment, opened with the
    /// writer's flags. The process therefore needs write access to the index
    /// directory (LMDB keeps its reader table in `lock.mdb`), and indexes on
    /// read-only filesystems cannot be served.
    ///
    /// # Errors
    ///
    /// - [`IndexError::NotInitialized`] when the directory holds no index
    /// - [`IndexError::SchemaVersionMismatch`] when it was built by another
    ///   schema version
    pub fn open_read_only<P: AsRef<Path>>(path: P, options: &StorageOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.join(DATA_FILE_NAME).is_file() {
            return Err(IndexError::NotInitialized(path));
        }

        let shared = registry::acquire(&path, options)?;
        let env = &shared.env;
        let rtxn = env.read_txn().map_err(map_heed)?;
        let tables = match Tables::open(env, &rtxn)? {
            Some(tables) => tables,
            None => return Err(IndexError::NotInitialized(path)),
        };
        let meta = match tables.meta(&rtxn)? {
            Some(meta) => meta,
            None => return Err(IndexError::NotInitialized(path)),
        };
        // Database handles opened in a read transaction become usable by
        // other transactions only once it commits.
        rtxn.commit().map_err(map_heed)?;

        if !meta.complete {
            warn!(
                target: "sdfdex::env",
                path = ?path,
                "Index build has not completed; results may be partial"
            );
        }
        info!(
            target: "sdfdex::env",
            path = ?path,
            schema_version = meta.schema_version,
            records = meta.counts.total_records(),
            "Opened index read-only"
        );

        Ok(Self {
            path,
            shared,
            tables,
            mode: AccessMode::ReadOnly,
            _lock: None,
        })
    }

    /// Index directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Access mode of this handle
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Table handles
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Begin a read-only snapshot transaction
    pub fn read_txn(&self) -> Result<RoTxn<'_>> {
        self.shared.env.read_txn().map_err(map_heed)
    }

    /// Begin the write transaction
    ///
    /// # Errors
    ///
    /// [`IndexError::ReadOnly`] on a read-only handle.
    pub fn write_txn(&self) -> Result<RwTxn<'_>> {
        if self.mode == AccessMode::ReadOnly {
            return Err(IndexError::ReadOnly);
        }
        self.shared.env.write_txn().map_err(map_heed)
    }

    /// Current meta entry
    pub fn meta(&self) -> Result<Option<IndexMeta>> {
        let rtxn = self.read_txn()?;
        self.tables.meta(&rtxn)
    }

    /// Flush the environment to disk
    pub fn sync(&self) -> Result<()> {
        self.shared.env.force_sync().map_err(map_heed)
    }

    /// Close the handle, releasing the build lock of a writable handle
    pub fn close(self) {
        drop(self);
    }
}

pub(crate) fn open_env(path: &Path, options: &StorageOptions) -> Result<Env> {
    // SAFETY: the index directory is only ever opened through this function,
    // always with the same flags, and its files are not modified outside LMDB.
    let env = unsafe {
        EnvOpenOptions::new()
            .map_size(options.map_size)
            .max_dbs(MAX_DBS)
            .max_readers(options.max_readers)
            .open(path)
    };
    env.map_err(map_heed)
}
