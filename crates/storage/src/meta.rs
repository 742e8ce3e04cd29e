//! Index meta entry
//!
//! One JSON document stored under [`META_KEY`](crate::schema::META_KEY) in the
//! `meta` table. It is written when a build starts (`complete = false`) and
//! rewritten with the final counts when the build commits its last batch.

use chrono::{DateTime, Utc};
use sdfdex_core::{IndexError, Result, POSTING_PAGE_CAPACITY, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};

/// Per-build counters
///
/// Conditions that do not abort a build are counted here instead of being
/// raised as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    /// Files indexed
    pub files: u64,
    /// Files skipped by the classifier or with unusable paths
    pub skipped_files: u64,
    /// Compound records stored
    pub compound_records: u64,
    /// Conformer records stored
    pub conformer_records: u64,
    /// Records stored without their kind's domain key
    pub unkeyed_records: u64,
    /// Trailing fragments without a delimiter, dropped
    pub truncated_records: u64,
    /// CIDs seen on more than one compound record
    pub duplicate_cids: u64,
    /// Conformer ids seen on more than one conformer record
    pub duplicate_conformer_ids: u64,
    /// Distinct CIDs owning at least one posting entry
    pub posting_cids: u64,
    /// Posting pages written
    pub posting_pages: u64,
}

impl RecordCounts {
    /// Total records stored
    pub fn total_records(&self) -> u64 {
        self.compound_records + self.conformer_records
    }

    /// Add another set of counters into this one
    pub fn merge(&mut self, other: &RecordCounts) {
        self.files += other.files;
        self.skipped_files += other.skipped_files;
        self.compound_records += other.compound_records;
        self.conformer_records += other.conformer_records;
        self.unkeyed_records += other.unkeyed_records;
        self.truncated_records += other.truncated_records;
        self.duplicate_cids += other.duplicate_cids;
        self.duplicate_conformer_ids += other.duplicate_conformer_ids;
        self.posting_cids += other.posting_cids;
        self.posting_pages += other.posting_pages;
    }
}

/// Metadata describing one index generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// On-disk schema version
    pub schema_version: u32,
    /// When the build started
    pub build_time: DateTime<Utc>,
    /// Root directory the relative paths are resolved against
    pub root_dir: String,
    /// Identifiers per posting page
    pub page_capacity: u32,
    /// Record delimiter line
    pub delimiter: String,
    /// False while a build is still writing
    pub complete: bool,
    /// Build counters
    #[serde(default)]
    pub counts: RecordCounts,
}

impl IndexMeta {
    /// Meta entry for a build that is starting now
    pub fn started(root_dir: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            build_time: Utc::now(),
            root_dir: root_dir.into(),
            page_capacity: POSTING_PAGE_CAPACITY as u32,
            delimiter: delimiter.into(),
            complete: false,
            counts: RecordCounts::default(),
        }
    }

    /// Serialize for the meta table
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from the meta table
    ///
    /// The schema version is read before the full document so that a future
    /// layout still reports a version mismatch rather than a parse error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        #[derive(Deserialize)]
        struct VersionProbe {
            schema_version: u32,
        }
        let probe: VersionProbe = serde_json::from_slice(bytes)
            .map_err(|e| IndexError::corruption(format!("unreadable meta entry: {}", e)))?;
        check_schema_version(probe.schema_version)?;
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Reject an index written by a different schema version
fn check_schema_version(found: u32) -> Result<()> {
    if found != SCHEMA_VERSION {
        return Err(IndexError::SchemaVersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        });
    }
    Ok(())
}
