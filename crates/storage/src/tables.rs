//! Typed access to the index tables
//!
//! `Tables` holds the eight database handles of one environment. Every method
//! takes the transaction explicitly: read methods accept any `RoTxn` (a
//! `RwTxn` derefs to one), write methods need the builder's `RwTxn`.

use crate::env::map_heed;
use crate::meta::IndexMeta;
use crate::schema::{
    cid_key, decode_file_id, decode_page_count, encode_page_count, file_id_key, page_key,
    RecordKey, ALL_TABLES, CID_TO_COMPOUND_TABLE, CONFID_TO_CONF_TABLE, CONFORMER_HEADERS_TABLE,
    CONFORMER_PAGES_TABLE, FILES_REV_TABLE, FILES_TABLE, META_KEY, META_TABLE, RECORDS_TABLE,
};
use heed::types::Bytes;
use heed::{Database, Env, RoTxn, RwTxn};
use sdfdex_core::{Alid, Cid, FileId, IndexError, IndexHit, RecordKind, RecordLocator, Result};

type Table = Database<Bytes, Bytes>;

/// Database handles of one index environment
#[derive(Debug, Clone, Copy)]
pub struct Tables {
    meta: Table,
    files: Table,
    files_rev: Table,
    records: Table,
    cid_to_compound: Table,
    confid_to_conf: Table,
    conformer_headers: Table,
    conformer_pages: Table,
}

impl Tables {
    /// Create (or open) every table inside a write transaction
    pub(crate) fn create(env: &Env, wtxn: &mut RwTxn<'_>) -> Result<Self> {
        let mut create = |name: &str| -> Result<Table> {
            env.create_database::<Bytes, Bytes>(&mut *wtxn, Some(name))
                .map_err(map_heed)
        };
        Ok(Self {
            meta: create(META_TABLE)?,
            files: create(FILES_TABLE)?,
            files_rev: create(FILES_REV_TABLE)?,
            records: create(RECORDS_TABLE)?,
            cid_to_compound: create(CID_TO_COMPOUND_TABLE)?,
            confid_to_conf: create(CONFID_TO_CONF_TABLE)?,
            conformer_headers: create(CONFORMER_HEADERS_TABLE)?,
            conformer_pages: create(CONFORMER_PAGES_TABLE)?,
        })
    }

    /// Open existing tables; `None` when any of them is missing
    pub(crate) fn open(env: &Env, rtxn: &RoTxn<'_>) -> Result<Option<Self>> {
        let mut handles = Vec::with_capacity(ALL_TABLES.len());
        for name in ALL_TABLES {
            match env
                .open_database::<Bytes, Bytes>(rtxn, Some(name))
                .map_err(map_heed)?
            {
                Some(db) => handles.push(db),
                None => return Ok(None),
            }
        }
        Ok(Some(Self {
            meta: handles[0],
            files: handles[1],
            files_rev: handles[2],
            records: handles[3],
            cid_to_compound: handles[4],
            confid_to_conf: handles[5],
            conformer_headers: handles[6],
            conformer_pages: handles[7],
        }))
    }

    /// Empty every table except `meta`
    pub fn clear_data(&self, wtxn: &mut RwTxn<'_>) -> Result<()> {
        for table in [
            self.files,
            self.files_rev,
            self.records,
            self.cid_to_compound,
            self.confid_to_conf,
            self.conformer_headers,
            self.conformer_pages,
        ] {
            table.clear(wtxn).map_err(map_heed)?;
        }
        Ok(())
    }

    // ========================================================================
    // Meta
    // ========================================================================

    /// Read the meta entry
    pub fn meta(&self, txn: &RoTxn<'_>) -> Result<Option<IndexMeta>> {
        match self.meta.get(txn, META_KEY).map_err(map_heed)? {
            Some(bytes) => Ok(Some(IndexMeta::from_bytes(bytes)?)),
            None => Ok(None),
        }
    }

    /// Write the meta entry
    pub fn put_meta(&self, wtxn: &mut RwTxn<'_>, meta: &IndexMeta) -> Result<()> {
        let bytes = meta.to_bytes()?;
        self.meta.put(wtxn, META_KEY, &bytes).map_err(map_heed)
    }

    /// Write raw bytes as the meta entry
    #[doc(hidden)]
    pub fn put_meta_raw(&self, wtxn: &mut RwTxn<'_>, bytes: &[u8]) -> Result<()> {
        self.meta.put(wtxn, META_KEY, bytes).map_err(map_heed)
    }

    // ========================================================================
    // Files
    // ========================================================================

    /// Register a file in both directions
    pub fn put_file(&self, wtxn: &mut RwTxn<'_>, file_id: FileId, relative_path: &str) -> Result<()> {
        let id = file_id_key(file_id);
        self.files
            .put(wtxn, &id[..], relative_path.as_bytes())
            .map_err(map_heed)?;
        self.files_rev
            .put(wtxn, relative_path.as_bytes(), &id[..])
            .map_err(map_heed)
    }

    /// Relative path of a file id
    pub fn file_path(&self, txn: &RoTxn<'_>, file_id: FileId) -> Result<Option<String>> {
        match self
            .files
            .get(txn, &file_id_key(file_id)[..])
            .map_err(map_heed)?
        {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| IndexError::corruption(format!("file path is not UTF-8: {}", e))),
            None => Ok(None),
        }
    }

    /// File id of a relative path
    pub fn file_id(&self, txn: &RoTxn<'_>, relative_path: &str) -> Result<Option<FileId>> {
        match self
            .files_rev
            .get(txn, relative_path.as_bytes())
            .map_err(map_heed)?
        {
            Some(bytes) => Ok(Some(decode_file_id(bytes)?)),
            None => Ok(None),
        }
    }

    /// All registered files in file id order
    pub fn files(&self, txn: &RoTxn<'_>) -> Result<Vec<(FileId, String)>> {
        let mut out = Vec::new();
        for entry in self.files.iter(txn).map_err(map_heed)? {
            let (key, value) = entry.map_err(map_heed)?;
            let path = String::from_utf8(value.to_vec())
                .map_err(|e| IndexError::corruption(format!("file path is not UTF-8: {}", e)))?;
            out.push((decode_file_id(key)?, path));
        }
        Ok(out)
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Store the locator of a record
    pub fn put_record(&self, wtxn: &mut RwTxn<'_>, key: &RecordKey, locator: &RecordLocator) -> Result<()> {
        self.records
            .put(wtxn, key.as_bytes(), &locator.to_bytes()[..])
            .map_err(map_heed)
    }

    /// Resolve a records key to a hit
    pub fn record(&self, txn: &RoTxn<'_>, key: &RecordKey) -> Result<Option<IndexHit>> {
        match self.records.get(txn, key.as_bytes()).map_err(map_heed)? {
            Some(bytes) => {
                let locator = RecordLocator::from_bytes(bytes)?;
                Ok(Some(IndexHit {
                    alid: key.alid(),
                    locator,
                }))
            }
            None => Ok(None),
        }
    }

    /// Resolve an identifier of a known kind
    pub fn record_by_alid(&self, txn: &RoTxn<'_>, kind: RecordKind, alid: &Alid) -> Result<Option<IndexHit>> {
        self.record(txn, &RecordKey::new(kind, alid))
    }

    /// Number of entries in the records table
    pub fn record_count(&self, txn: &RoTxn<'_>) -> Result<u64> {
        self.records.len(txn).map_err(map_heed)
    }

    /// Every record in key order: compounds first, then conformers
    pub fn records<'t>(&self, txn: &'t RoTxn<'_>) -> Result<impl Iterator<Item = Result<IndexHit>> + 't> {
        let iter = self.records.iter(txn).map_err(map_heed)?;
        Ok(iter.map(|entry| {
            let (key, value) = entry.map_err(map_heed)?;
            let key = RecordKey::from_slice(key)?;
            Ok(IndexHit {
                alid: key.alid(),
                locator: RecordLocator::from_bytes(value)?,
            })
        }))
    }

    // ========================================================================
    // Unique-key indices
    // ========================================================================

    /// Records key of the compound with this CID
    pub fn compound_key(&self, txn: &RoTxn<'_>, cid: Cid) -> Result<Option<RecordKey>> {
        match self
            .cid_to_compound
            .get(txn, &cid_key(cid)[..])
            .map_err(map_heed)?
        {
            Some(bytes) => Ok(Some(RecordKey::from_slice(bytes)?)),
            None => Ok(None),
        }
    }

    /// Point a CID at a compound record
    pub fn put_compound_key(&self, wtxn: &mut RwTxn<'_>, cid: Cid, key: &RecordKey) -> Result<()> {
        self.cid_to_compound
            .put(wtxn, &cid_key(cid)[..], key.as_bytes())
            .map_err(map_heed)
    }

    /// Records key of the conformer with this id
    pub fn conformer_key(&self, txn: &RoTxn<'_>, conformer_id: &str) -> Result<Option<RecordKey>> {
        match self
            .confid_to_conf
            .get(txn, conformer_id.as_bytes())
            .map_err(map_heed)?
        {
            Some(bytes) => Ok(Some(RecordKey::from_slice(bytes)?)),
            None => Ok(None),
        }
    }

    /// Point a conformer id at a conformer record
    pub fn put_conformer_key(&self, wtxn: &mut RwTxn<'_>, conformer_id: &str, key: &RecordKey) -> Result<()> {
        self.confid_to_conf
            .put(wtxn, conformer_id.as_bytes(), key.as_bytes())
            .map_err(map_heed)
    }

    // ========================================================================
    // Posting lists
    // ========================================================================

    /// Page count recorded for a CID (0 when it has no header)
    pub fn page_count(&self, txn: &RoTxn<'_>, cid: Cid) -> Result<u32> {
        match self
            .conformer_headers
            .get(txn, &cid_key(cid)[..])
            .map_err(map_heed)?
        {
            Some(bytes) => decode_page_count(bytes),
            None => Ok(0),
        }
    }

    /// Write the page count header of a CID
    pub fn put_page_count(&self, wtxn: &mut RwTxn<'_>, cid: Cid, count: u32) -> Result<()> {
        self.conformer_headers
            .put(wtxn, &cid_key(cid)[..], &encode_page_count(count)[..])
            .map_err(map_heed)
    }

    /// Posting page blob, borrowed from the transaction
    pub fn page<'t>(&self, txn: &'t RoTxn<'_>, cid: Cid, page_no: u32) -> Result<Option<&'t [u8]>> {
        self.conformer_pages
            .get(txn, &page_key(cid, page_no)[..])
            .map_err(map_heed)
    }

    /// Write a posting page blob
    pub fn put_page(&self, wtxn: &mut RwTxn<'_>, cid: Cid, page_no: u32, blob: &[u8]) -> Result<()> {
        self.conformer_pages
            .put(wtxn, &page_key(cid, page_no)[..], blob)
            .map_err(map_heed)
    }
}
