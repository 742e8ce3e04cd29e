//! Error types for the offset index
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Conditions that do not abort a build (unclassifiable files, truncated
//! records, missing keys, duplicate keys) are not errors: the builder counts
//! them in its report. Lookup misses are `None`, never an error.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Error types for the offset index
#[derive(Debug, Error)]
pub enum IndexError {
    /// I/O error (source files, lock file, index directory)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reported by the key-value store
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored bytes do not decode to what the schema expects
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Serialization/deserialization error (meta entry, reports)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Index was written with a different schema version
    #[error("Schema version mismatch: index has {found}, expected {expected}")]
    SchemaVersionMismatch {
        /// Version this build understands
        expected: u32,
        /// Version found in the index meta entry
        found: u32,
    },

    /// Index directory holds no index (missing tables or meta entry)
    #[error("No index found at {0}")]
    NotInitialized(PathBuf),

    /// Another writer holds the build lock
    #[error("Index at {0} is locked by another writer")]
    WriterLocked(PathBuf),

    /// Write attempted through a read-only handle
    #[error("Index handle is read-only")]
    ReadOnly,

    /// Locator points at a file id the files table does not know
    #[error("Unknown file id {0}")]
    UnknownFile(u32),

    /// Invalid argument or configuration value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IndexError {
    /// Create a storage error from any displayable message
    pub fn storage(msg: impl std::fmt::Display) -> Self {
        IndexError::Storage(msg.to_string())
    }

    /// Create a corruption error from any displayable message
    pub fn corruption(msg: impl std::fmt::Display) -> Self {
        IndexError::Corruption(msg.to_string())
    }

    /// Create an invalid-input error from any displayable message
    pub fn invalid_input(msg: impl std::fmt::Display) -> Self {
        IndexError::InvalidInput(msg.to_string())
    }

    /// Whether the error ends the session rather than a single operation
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IndexError::SchemaVersionMismatch { .. }
                | IndexError::NotInitialized(_)
                | IndexError::Corruption(_)
        )
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(e: serde_json::Error) -> Self {
        IndexError::Serialization(e.to_string())
    }
}
