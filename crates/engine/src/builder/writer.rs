//! Single sequential index writer
//!
//! Owns the write transaction of a build. Records arrive in file order and are
//! written to `records`, the unique-key indices and the posting lists. The
//! transaction is committed every `commit_every` records and at the end of
//! every file, so readers see whole files appear batch by batch.

use super::posting::PostingWriter;
use super::scanner::ExtractedRecord;
use crate::collab::ExtractedFields;
use crate::config::{BuildConfig, DuplicatePolicy};
use sdfdex_core::{
    validate_key, Alid, IndexError, RecordKind, RecordLocator, Result, SourceFile, MAX_CID,
};
use sdfdex_storage::{map_heed, IndexEnv, IndexMeta, RecordCounts, RecordKey, RwTxn, Tables};
use tracing::{debug, warn};

/// Write side of one build
pub struct IndexWriter<'e> {
    env: &'e IndexEnv,
    tables: Tables,
    txn: Option<RwTxn<'e>>,
    postings: PostingWriter,
    policy: DuplicatePolicy,
    commit_every: usize,
    pending: usize,
    counts: RecordCounts,
    meta: IndexMeta,
}

impl<'e> IndexWriter<'e> {
    /// Start a full rebuild: empty every data table and mark the index
    /// incomplete in one committed transaction.
    pub fn begin(env: &'e IndexEnv, root_dir: &str, config: &BuildConfig) -> Result<Self> {
        let tables = *env.tables();
        let meta = IndexMeta::started(root_dir, config.delimiter.clone());

        let mut wtxn = env.write_txn()?;
        tables.clear_data(&mut wtxn)?;
        tables.put_meta(&mut wtxn, &meta)?;
        wtxn.commit().map_err(map_heed)?;

        Ok(Self {
            env,
            tables,
            txn: Some(env.write_txn()?),
            postings: PostingWriter::new(tables, config.posting_buffer_limit),
            policy: config.duplicate_policy,
            commit_every: config.commit_every.max(1),
            pending: 0,
            counts: RecordCounts::default(),
            meta,
        })
    }

    fn txn(&mut self) -> Result<&mut RwTxn<'e>> {
        self.txn
            .as_mut()
            .ok_or_else(|| IndexError::storage("write transaction already finished"))
    }

    /// Counters so far
    pub fn counts(&self) -> &RecordCounts {
        &self.counts
    }

    /// Count a file that is not indexed
    pub fn skip_file(&mut self) {
        self.counts.skipped_files += 1;
    }

    /// Count a trailing fragment that was dropped
    pub fn truncated_record(&mut self) {
        self.counts.truncated_records += 1;
    }

    /// Register a file in the files tables
    pub fn add_file(&mut self, file: &SourceFile) -> Result<()> {
        let tables = self.tables;
        tables.put_file(self.txn()?, file.file_id, &file.relative_path)?;
        self.counts.files += 1;
        Ok(())
    }

    /// Write one record and its index entries
    pub fn add_record(&mut self, file: &SourceFile, record: &ExtractedRecord) -> Result<()> {
        let kind = file.kind;
        let fields = usable_fields(file, record);
        let domain_id = fields.domain_id(kind);
        let alid = Alid::generate(kind, &file.relative_path, record.seq_no, domain_id.as_deref());
        let cid = fields.effective_cid(kind);
        let locator = RecordLocator::new(file.file_id, record.start, record.end, kind, cid)?;
        let key = RecordKey::new(kind, &alid);

        let tables = self.tables;
        let policy = self.policy;
        let wtxn = self
            .txn
            .as_mut()
            .ok_or_else(|| IndexError::storage("write transaction already finished"))?;
        tables.put_record(wtxn, &key, &locator)?;

        match kind {
            RecordKind::Compound => {
                self.counts.compound_records += 1;
                match fields.cid {
                    Some(cid) => {
                        if tables.compound_key(wtxn, cid)?.is_some() {
                            self.counts.duplicate_cids += 1;
                            debug!(
                                target: "sdfdex::build",
                                cid,
                                file = %file.relative_path,
                                seq_no = record.seq_no,
                                "Duplicate CID"
                            );
                            if policy == DuplicatePolicy::KeepLast {
                                tables.put_compound_key(wtxn, cid, &key)?;
                            }
                        } else {
                            tables.put_compound_key(wtxn, cid, &key)?;
                        }
                    }
                    None => self.counts.unkeyed_records += 1,
                }
            }
            RecordKind::Conformer => {
                self.counts.conformer_records += 1;
                match fields.conformer_id.as_deref() {
                    Some(id) if validate_key(id.as_bytes()).is_ok() => {
                        if tables.conformer_key(wtxn, id)?.is_some() {
                            self.counts.duplicate_conformer_ids += 1;
                            debug!(
                                target: "sdfdex::build",
                                conformer_id = id,
                                file = %file.relative_path,
                                seq_no = record.seq_no,
                                "Duplicate conformer id"
                            );
                            if policy == DuplicatePolicy::KeepLast {
                                tables.put_conformer_key(wtxn, id, &key)?;
                            }
                        } else {
                            tables.put_conformer_key(wtxn, id, &key)?;
                        }
                    }
                    Some(id) => {
                        warn!(
                            target: "sdfdex::build",
                            len = id.len(),
                            file = %file.relative_path,
                            seq_no = record.seq_no,
                            "Conformer id too long for a key; record stored unkeyed"
                        );
                        self.counts.unkeyed_records += 1;
                    }
                    None => self.counts.unkeyed_records += 1,
                }
                if let Some(cid) = cid {
                    self.postings.push(wtxn, cid, &alid)?;
                }
            }
        }

        self.pending += 1;
        if self.pending >= self.commit_every {
            self.commit()?;
        }
        Ok(())
    }

    /// Close a file; commits whatever it left pending
    pub fn end_file(&mut self) -> Result<()> {
        if self.pending > 0 {
            self.commit()?;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if let Some(txn) = self.txn.take() {
            txn.commit().map_err(map_heed)?;
        }
        debug!(target: "sdfdex::build", records = self.pending, "Committed batch");
        self.pending = 0;
        self.txn = Some(self.env.write_txn()?);
        Ok(())
    }

    /// Write the posting headers and the final meta entry, then commit.
    pub fn finish(mut self) -> Result<RecordCounts> {
        let mut wtxn = self
            .txn
            .take()
            .ok_or_else(|| IndexError::storage("write transaction already finished"))?;
        let totals = self.postings.finish(&mut wtxn)?;
        self.counts.posting_cids = totals.cids;
        self.counts.posting_pages = totals.pages;

        self.meta.complete = true;
        self.meta.counts = self.counts.clone();
        self.tables.put_meta(&mut wtxn, &self.meta)?;
        wtxn.commit().map_err(map_heed)?;
        self.env.sync()?;
        Ok(self.counts)
    }
}

/// A record's fields with every CID a locator cannot hold treated as absent.
fn usable_fields(file: &SourceFile, record: &ExtractedRecord) -> ExtractedFields {
    let mut fields = record.fields.clone();
    for slot in [&mut fields.cid, &mut fields.parent_cid] {
        if let Some(cid) = *slot {
            if cid > MAX_CID {
                warn!(
                    target: "sdfdex::build",
                    cid,
                    file = %file.relative_path,
                    seq_no = record.seq_no,
                    "CID out of range; treated as absent"
                );
                *slot = None;
            }
        }
    }
    fields
}
