//! Domain types shared by the builder, the store and the query engine

use crate::alid::Alid;
use crate::error::IndexError;
use crate::locator::RecordLocator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dense per-build file identifier
pub type FileId = u32;

/// Compound identifier extracted from record content
pub type Cid = u64;

/// Kind of record stored in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Compound record, keyed by CID
    Compound,
    /// Conformer record, keyed by conformer id, child of a CID
    Conformer,
}

impl RecordKind {
    /// Name used in the identifier template
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Compound => "compound",
            RecordKind::Conformer => "conformer",
        }
    }

    /// One-byte prefix of `records` keys
    pub fn tag(&self) -> u8 {
        match self {
            RecordKind::Compound => b'C',
            RecordKind::Conformer => b'F',
        }
    }

    /// Inverse of [`RecordKind::tag`]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'C' => Some(RecordKind::Compound),
            b'F' => Some(RecordKind::Conformer),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compound" => Ok(RecordKind::Compound),
            "conformer" => Ok(RecordKind::Conformer),
            other => Err(IndexError::invalid_input(format!(
                "unknown record kind '{}'",
                other
            ))),
        }
    }
}

/// Classification of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// File of compound records
    Compound,
    /// File of conformer records
    Conformer,
    /// Not indexable; skipped by the builder
    Unknown,
}

impl FileKind {
    /// Record kind held by this file, if it is indexable
    pub fn record_kind(&self) -> Option<RecordKind> {
        match self {
            FileKind::Compound => Some(RecordKind::Compound),
            FileKind::Conformer => Some(RecordKind::Conformer),
            FileKind::Unknown => None,
        }
    }
}

impl From<RecordKind> for FileKind {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Compound => FileKind::Compound,
            RecordKind::Conformer => FileKind::Conformer,
        }
    }
}

/// A source file registered in one index generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Dense id, assigned in relative-path order
    pub file_id: FileId,
    /// Root-relative path with `/` separators
    pub relative_path: String,
    /// Kind of records the file holds
    pub kind: RecordKind,
}

/// Resolved record: identifier plus locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHit {
    /// Record identifier
    pub alid: Alid,
    /// Where the record's bytes live
    pub locator: RecordLocator,
}

/// Domain key accepted by batch lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookupKey {
    /// Compound CID
    Cid(Cid),
    /// Conformer identifier
    ConformerId(String),
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Cid(cid) => write!(f, "{}", cid),
            LookupKey::ConformerId(id) => f.write_str(id),
        }
    }
}

impl From<Cid> for LookupKey {
    fn from(cid: Cid) -> Self {
        LookupKey::Cid(cid)
    }
}

impl From<String> for LookupKey {
    fn from(id: String) -> Self {
        LookupKey::ConformerId(id)
    }
}

impl From<&str> for LookupKey {
    fn from(id: &str) -> Self {
        LookupKey::ConformerId(id.to_string())
    }
}
