//! Collaborators of the index builder
//!
//! The builder does not know SDF file naming or property layout; it asks a
//! [`FileClassifier`] what a file holds and a [`FieldExtractor`] which keys a
//! record carries. Default implementations driven by [`BuildConfig`] cover the
//! common PubChem layout.
//!
//! [`BuildConfig`]: crate::config::BuildConfig

mod classifier;
mod extractor;
mod walk;

pub use classifier::NamePatternClassifier;
pub use extractor::SdfFieldExtractor;
pub use walk::{walk_source_files, CandidateFile, SourceListing};

use sdfdex_core::{Cid, FileKind, RecordKind};
use std::path::Path;

/// Decides what kind of records a file holds.
pub trait FileClassifier: Send + Sync {
    /// Classify a file by its root-relative path.
    fn classify(&self, relative_path: &Path) -> FileKind;
}

/// Pulls domain keys out of one raw record.
pub trait FieldExtractor: Send + Sync {
    /// Extract keys from the record bytes (delimiter line included).
    fn extract(&self, raw: &[u8], kind: RecordKind) -> ExtractedFields;
}

/// Keys found in one record; all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Compound identifier
    pub cid: Option<Cid>,
    /// Conformer identifier
    pub conformer_id: Option<String>,
    /// Parent compound of a conformer
    pub parent_cid: Option<Cid>,
}

impl ExtractedFields {
    /// CID stored in the locator. A conformer's CID field names its parent;
    /// the parent fields are the fallback.
    pub fn effective_cid(&self, kind: RecordKind) -> Option<Cid> {
        match kind {
            RecordKind::Compound => self.cid,
            RecordKind::Conformer => self.cid.or(self.parent_cid),
        }
    }

    /// Domain key that feeds the identifier, empty when absent.
    pub fn domain_id(&self, kind: RecordKind) -> Option<String> {
        match kind {
            RecordKind::Compound => self.cid.map(|cid| cid.to_string()),
            RecordKind::Conformer => self.conformer_id.clone(),
        }
    }
}
