//! Storage layer for sdfdex
//!
//! This crate owns the on-disk index: one LMDB environment per index
//! directory, accessed through `heed`, holding eight named tables:
//! - `meta`: schema version, build time, root directory, build counters
//! - `files` / `files_rev`: dense file ids and relative paths
//! - `records`: tagged identifier -> 32-byte locator
//! - `cid_to_compound`, `confid_to_conf`: unique-key indices
//! - `cid_to_conformers_h` / `_p`: paged CID -> conformer posting lists
//!
//! Writers are exclusive (see [`BuildLock`]); readers get snapshot
//! transactions that never observe a partially committed batch.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod env;
pub mod lock;
pub mod meta;
mod registry;
pub mod schema;
pub mod tables;

pub use env::{map_heed, AccessMode, IndexEnv, StorageOptions, DATA_FILE_NAME};
pub use heed::{RoTxn, RwTxn};
pub use lock::{BuildLock, LOCK_FILE_NAME};
pub use meta::{IndexMeta, RecordCounts};
pub use schema::RecordKey;
pub use tables::Tables;
