//! Shared test utilities for the workspace integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::fs;
use std::path::{Path, PathBuf};

pub use sdfdex::{
    Alid, BuildReport, Cid, DuplicatePolicy, IndexConfig, IndexEnv, IndexError, IndexHit,
    LookupKey, RecordKind, RecordLocator, SdfIndex, StorageOptions,
};
use tempfile::TempDir;

// ============================================================================
// Record text
// ============================================================================

/// A compound record; the title line and the CID property both carry `cid`.
pub fn compound_record(cid: Option<Cid>) -> String {
    match cid {
        Some(cid) => format!(
            "{cid}\n  sdfdex-test\n\n  1  0  0     0  0  0  0  0  0999 V2000\n    0.0000    0.0000    0.0000 C   0  0\nM  END\n> <PUBCHEM_COMPOUND_CID>\n{cid}\n\n> <PUBCHEM_IUPAC_NAME>\ncompound {cid}\n\n$$$$\n"
        ),
        None => "untitled\n  sdfdex-test\n\nM  END\n> <PUBCHEM_IUPAC_NAME>\nmystery\n\n$$$$\n".to_string(),
    }
}

/// A conformer record with an optional id and parent CID.
pub fn conformer_record(conformer_id: Option<&str>, parent: Option<Cid>) -> String {
    let mut text = String::from("conformer\n  sdfdex-test\n\nM  END\n");
    if let Some(id) = conformer_id {
        text.push_str(&format!("> <PUBCHEM_CONFORMER_ID>\n{id}\n\n"));
    }
    if let Some(cid) = parent {
        text.push_str(&format!("> <PUBCHEM_COMPOUND_CID>\n{cid}\n\n"));
    }
    text.push_str("$$$$\n");
    text
}

/// Concatenated compound records.
pub fn compound_file(cids: impl IntoIterator<Item = Cid>) -> String {
    cids.into_iter().map(|c| compound_record(Some(c))).collect()
}

/// Concatenated conformer records, `(id, parent)` each.
pub fn conformer_file<'a>(records: impl IntoIterator<Item = (&'a str, Cid)>) -> String {
    records
        .into_iter()
        .map(|(id, cid)| conformer_record(Some(id), Some(cid)))
        .collect()
}

// ============================================================================
// Fixture
// ============================================================================

/// Small storage options so many environments fit in a test run.
pub fn test_storage() -> StorageOptions {
    StorageOptions {
        map_size: 512 * 1024 * 1024,
        max_readers: 64,
    }
}

/// Config with test storage options.
pub fn test_config() -> IndexConfig {
    IndexConfig {
        storage: test_storage(),
        ..IndexConfig::default()
    }
}

/// A source tree and an index directory, both temporary.
pub struct Fixture {
    pub root: TempDir,
    pub index: TempDir,
    pub config: IndexConfig,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("Failed to create root dir"),
            index: tempfile::tempdir().expect("Failed to create index dir"),
            config: test_config(),
        }
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    pub fn index_path(&self) -> &Path {
        self.index.path()
    }

    /// Write a source file at a root-relative path.
    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create source dir");
        }
        fs::write(&path, content).expect("Failed to write source file");
        path
    }

    /// Full rebuild with the fixture's config.
    pub fn build(&self) -> BuildReport {
        SdfIndex::build(self.root.path(), self.index.path(), &self.config).expect("Build failed")
    }

    pub fn try_build(&self) -> sdfdex::Result<BuildReport> {
        SdfIndex::build(self.root.path(), self.index.path(), &self.config)
    }

    pub fn open(&self) -> SdfIndex {
        SdfIndex::open(self.index.path(), &self.config).expect("Open failed")
    }

    /// Bytes of a source file.
    pub fn source(&self, relative: &str) -> Vec<u8> {
        fs::read(self.root.path().join(relative)).expect("Failed to read source file")
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The CID field of a record's text.
pub fn record_cid(text: &str) -> Option<Cid> {
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        if line.trim() == "> <PUBCHEM_COMPOUND_CID>" {
            return lines.next().and_then(|v| v.trim().parse().ok());
        }
    }
    None
}

/// The conformer id field of a record's text.
pub fn record_conformer_id(text: &str) -> Option<String> {
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        if line.trim() == "> <PUBCHEM_CONFORMER_ID>" {
            return lines.next().map(|v| v.trim().to_string());
        }
    }
    None
}

/// Every record in the index, sorted by identifier.
pub fn all_hits(index: &SdfIndex) -> Vec<IndexHit> {
    let env = index.env();
    let txn = env.read_txn().unwrap();
    let mut hits: Vec<IndexHit> = env
        .tables()
        .records(&txn)
        .unwrap()
        .map(|hit| hit.unwrap())
        .collect();
    hits.sort_by_key(|hit| hit.alid);
    hits
}
