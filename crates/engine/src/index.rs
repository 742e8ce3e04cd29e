//! `SdfIndex`: read-side handle combining the query engine and the reader
//!
//! ```no_run
//! use sdfdex_engine::{IndexConfig, SdfIndex};
//!
//! # fn main() -> sdfdex_core::Result<()> {
//! let config = IndexConfig::default();
//! SdfIndex::build("/data/pubchem", "/data/pubchem.idx", &config)?;
//!
//! let index = SdfIndex::open("/data/pubchem.idx", &config)?;
//! if let Some(hit) = index.lookup_compound(2244)? {
//!     let text = index.reader().read_text(&hit.locator)?;
//!     println!("{}", text);
//! }
//! for conformer in index.conformers_of(2244)? {
//!     println!("{}", conformer?.locator);
//! }
//! # Ok(())
//! # }
//! ```

use crate::builder::{BuildReport, IndexBuilder};
use crate::config::{IndexConfig, QueryConfig};
use crate::query::{self, BatchLookup, ConformerIter, PostingStats};
use crate::reader::RecordReader;
use sdfdex_core::{Alid, Cid, IndexError, IndexHit, LookupKey, RecordKind, RecordLocator, Result};
use sdfdex_storage::{IndexEnv, IndexMeta};
use std::path::{Path, PathBuf};
use tracing::info;

/// Read-only handle on a built index
#[derive(Debug)]
pub struct SdfIndex {
    env: IndexEnv,
    root: PathBuf,
    query: QueryConfig,
}

impl SdfIndex {
    /// Rebuild the index in `index_dir` from the files under `root`.
    ///
    /// Fails fast with `WriterLocked` when another build holds the directory.
    pub fn build<R: AsRef<Path>, P: AsRef<Path>>(root: R, index_dir: P, config: &IndexConfig) -> Result<BuildReport> {
        config.validate()?;
        let env = IndexEnv::open_writable(index_dir, &config.storage)?;
        let builder = IndexBuilder::new(root, config.build.clone())?;
        let report = builder.build(&env)?;
        env.close();
        Ok(report)
    }

    /// Open an index for queries, reading records relative to the root
    /// directory recorded at build time
    pub fn open<P: AsRef<Path>>(index_dir: P, config: &IndexConfig) -> Result<Self> {
        let env = IndexEnv::open_read_only(index_dir, &config.storage)?;
        let meta = env
            .meta()?
            .ok_or_else(|| IndexError::NotInitialized(env.path().to_path_buf()))?;
        let root = PathBuf::from(meta.root_dir);
        Ok(Self::from_env(env, root, config.query.clone()))
    }

    /// Open an index whose source files now live under `root`
    pub fn open_with_root<P: AsRef<Path>, R: AsRef<Path>>(index_dir: P, root: R, config: &IndexConfig) -> Result<Self> {
        let env = IndexEnv::open_read_only(index_dir, &config.storage)?;
        Ok(Self::from_env(env, root.as_ref().to_path_buf(), config.query.clone()))
    }

    fn from_env(env: IndexEnv, root: PathBuf, query: QueryConfig) -> Self {
        info!(target: "sdfdex::query", index = ?env.path(), root = ?root, "Index ready for queries");
        Self { env, root, query }
    }

    /// Underlying environment handle
    pub fn env(&self) -> &IndexEnv {
        &self.env
    }

    /// Root directory records are read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Meta entry of the current index generation
    pub fn meta(&self) -> Result<IndexMeta> {
        self.env
            .meta()?
            .ok_or_else(|| IndexError::NotInitialized(self.env.path().to_path_buf()))
    }

    /// Compound record with this CID
    pub fn lookup_compound(&self, cid: Cid) -> Result<Option<IndexHit>> {
        let txn = self.env.read_txn()?;
        query::lookup_compound(self.env.tables(), &txn, cid)
    }

    /// Conformer record with this conformer id
    pub fn lookup_conformer(&self, conformer_id: &str) -> Result<Option<IndexHit>> {
        let txn = self.env.read_txn()?;
        query::lookup_conformer(self.env.tables(), &txn, conformer_id)
    }

    /// Record with this identifier; compounds are tried first when `kind`
    /// is `None`
    pub fn get_by_alid(&self, alid: &Alid, kind: Option<RecordKind>) -> Result<Option<IndexHit>> {
        let txn = self.env.read_txn()?;
        query::get_by_alid(self.env.tables(), &txn, alid, kind)
    }

    /// Lazily traverse the conformers of a CID within one snapshot
    pub fn conformers_of(&self, cid: Cid) -> Result<ConformerIter<'_>> {
        let txn = self.env.read_txn()?;
        ConformerIter::new(*self.env.tables(), txn, cid)
    }

    /// Posting list shape of a CID
    pub fn posting_stats(&self, cid: Cid) -> Result<PostingStats> {
        let txn = self.env.read_txn()?;
        query::posting_stats(self.env.tables(), &txn, cid)
    }

    /// Resolve many keys, `chunk_size` per transaction (the configured
    /// default when `None`), yielding one entry per key in input order
    pub fn batch_lookup<I>(&self, keys: I, chunk_size: Option<usize>) -> BatchLookup<'_, I::IntoIter>
    where
        I: IntoIterator<Item = LookupKey>,
    {
        let chunk_size = chunk_size.unwrap_or(self.query.batch_chunk_size);
        BatchLookup::new(&self.env, keys.into_iter(), chunk_size)
    }

    /// Batch lookup of compounds by CID
    pub fn batch_compounds<I>(&self, cids: I) -> BatchLookup<'_, impl Iterator<Item = LookupKey>>
    where
        I: IntoIterator<Item = Cid>,
    {
        self.batch_lookup(cids.into_iter().map(LookupKey::Cid), None)
    }

    /// Batch lookup of conformers by conformer id
    pub fn batch_conformers<I, S>(&self, conformer_ids: I) -> BatchLookup<'_, impl Iterator<Item = LookupKey>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batch_lookup(
            conformer_ids
                .into_iter()
                .map(|id| LookupKey::ConformerId(id.into())),
            None,
        )
    }

    /// Reader resolving locators against this index's root
    pub fn reader(&self) -> RecordReader<'_> {
        RecordReader::new(&self.env, &self.root)
    }

    /// Raw bytes of a record
    pub fn read(&self, locator: &RecordLocator) -> Result<Vec<u8>> {
        self.reader().read(locator)
    }

    /// Release the environment handle
    pub fn close(self) {
        self.env.close();
    }
}
