//! Index engine for sdfdex
//!
//! This crate builds and queries the offset index:
//! - builder: streaming scan, field extraction, single sequential writer,
//!   paged posting lists
//! - query: point lookups, CID -> conformers traversal, chunked batches
//! - reader: locator -> record bytes
//! - collab: file classification, SDF field extraction, directory traversal
//! - config: `sdfdex.toml`
//!
//! [`SdfIndex`] is the read-side entry point; [`SdfIndex::build`] runs a full
//! rebuild.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod collab;
pub mod config;
pub mod index;
pub mod query;
pub mod reader;

pub use builder::{BuildReport, IndexBuilder};
pub use collab::{
    ExtractedFields, FieldExtractor, FileClassifier, NamePatternClassifier, SdfFieldExtractor,
};
pub use config::{BuildConfig, DuplicatePolicy, IndexConfig, QueryConfig, CONFIG_FILE_NAME};
pub use index::SdfIndex;
pub use query::{BatchEntry, BatchLookup, ConformerIter, PostingStats};
pub use reader::RecordReader;
