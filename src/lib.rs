//! sdfdex - byte-offset index for very large SDF record collections
//!
//! Builds an LMDB index over a directory of delimiter-terminated record files
//! so single records, all conformers of a compound, or millions of keys in a
//! batch can be located and read back without parsing whole files.
//!
//! # Quick Start
//!
//! ```ignore
//! use sdfdex::{IndexConfig, SdfIndex};
//!
//! let config = IndexConfig::default();
//! let report = SdfIndex::build("/data/pubchem", "/data/pubchem.idx", &config)?;
//!
//! let index = SdfIndex::open("/data/pubchem.idx", &config)?;
//! let hit = index.lookup_compound(2244)?;
//! ```
//!
//! # Architecture
//!
//! - `sdfdex-core`: identifiers, locators, errors
//! - `sdfdex-storage`: LMDB environment and table schema
//! - `sdfdex-engine`: builder, query engine, record reader, configuration

pub use sdfdex_core::*;
pub use sdfdex_engine::*;
pub use sdfdex_storage::{AccessMode, IndexEnv, IndexMeta, RecordCounts, StorageOptions};
