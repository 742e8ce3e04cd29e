//! Core types and identifiers for sdfdex
//!
//! This crate defines the foundational types used throughout the system:
//! - Alid: deterministic 128-bit record identifier
//! - RecordLocator: (file, start, end) span with its 32-byte encoding
//! - RecordKind / FileKind: compound vs conformer classification
//! - IndexHit, LookupKey, SourceFile: query and build data model
//! - IndexError: error type hierarchy
//! - Limits: schema version, page capacity, key size bounds

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alid;
pub mod error;
pub mod limits;
pub mod locator;
pub mod types;

pub use alid::{Alid, ALID_LEN, ALID_NAMESPACE};
pub use error::{IndexError, Result};
pub use limits::{
    validate_key, KeyError, DEFAULT_BATCH_CHUNK_SIZE, DEFAULT_DELIMITER, DEFAULT_MAP_SIZE,
    MAX_CID, MAX_KEY_BYTES, POSTING_PAGE_CAPACITY, SCHEMA_VERSION,
};
pub use locator::{RecordLocator, LOCATOR_LEN};
pub use types::{Cid, FileId, FileKind, IndexHit, LookupKey, RecordKind, SourceFile};
