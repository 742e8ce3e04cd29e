//! Fixed limits and format constants of the index
//!
//! ## Contract
//!
//! `SCHEMA_VERSION`, `POSTING_PAGE_CAPACITY` and the identifier template are
//! part of the on-disk compatibility contract. Changing any of them requires a
//! schema version bump and a full rebuild.

use thiserror::Error;

/// On-disk schema version written to, and checked against, the meta entry.
pub const SCHEMA_VERSION: u32 = 1;

/// Number of identifiers stored in one posting page.
pub const POSTING_PAGE_CAPACITY: usize = 4096;

/// Default number of keys resolved per read transaction in batch lookups.
pub const DEFAULT_BATCH_CHUNK_SIZE: usize = 50_000;

/// Default record delimiter line.
pub const DEFAULT_DELIMITER: &str = "$$$$";

/// Default LMDB map size (1 TiB of address space, not disk).
pub const DEFAULT_MAP_SIZE: usize = 1 << 40;

/// Largest key LMDB accepts with its default build flags.
pub const MAX_KEY_BYTES: usize = 511;

/// Largest CID representable in the signed 64-bit locator slot.
pub const MAX_CID: u64 = i64::MAX as u64;

/// Validate a byte string used as an LMDB key (conformer ids, relative paths)
///
/// Keys must be non-empty and at most [`MAX_KEY_BYTES`] long.
pub fn validate_key(key: &[u8]) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(KeyError::TooLong {
            actual: key.len(),
            max: MAX_KEY_BYTES,
        });
    }
    Ok(())
}

/// Key validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Key is empty (length 0)
    #[error("Key cannot be empty")]
    Empty,

    /// Key exceeds the store's maximum key length
    #[error("Key too long: {actual} bytes exceeds maximum {max}")]
    TooLong {
        /// Actual key length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}
