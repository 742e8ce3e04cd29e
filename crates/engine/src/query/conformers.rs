//! CID -> conformers traversal
//!
//! [`ConformerIter`] owns one read transaction for its whole life, so the
//! traversal sees a single snapshot even while a rebuild commits. It holds one
//! posting page in memory at a time; dropping the iterator ends the
//! transaction.

use sdfdex_core::{Alid, Cid, IndexError, IndexHit, RecordKind, Result, ALID_LEN, MAX_CID};
use sdfdex_storage::schema::page_len;
use sdfdex_storage::{RoTxn, Tables};
use serde::{Deserialize, Serialize};

/// Shape of one CID's posting list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingStats {
    /// Pages in the list
    pub page_count: u32,
    /// Identifiers across all pages
    pub entries: u64,
}

/// Page count and entry total of a CID's posting list
pub fn posting_stats(tables: &Tables, txn: &RoTxn<'_>, cid: Cid) -> Result<PostingStats> {
    if cid > MAX_CID {
        return Ok(PostingStats::default());
    }
    let page_count = tables.page_count(txn, cid)?;
    let mut entries = 0u64;
    for page_no in 0..page_count {
        let blob = tables
            .page(txn, cid, page_no)?
            .ok_or_else(|| missing_page(cid, page_no, page_count))?;
        entries += page_len(blob)? as u64;
    }
    Ok(PostingStats { page_count, entries })
}

fn missing_page(cid: Cid, page_no: u32, page_count: u32) -> IndexError {
    IndexError::corruption(format!(
        "CID {} has {} posting pages but page {} is missing",
        cid, page_count, page_no
    ))
}

/// Forward-only iterator over the conformers of one CID
pub struct ConformerIter<'e> {
    tables: Tables,
    txn: RoTxn<'e>,
    cid: Cid,
    page_count: u32,
    next_page: u32,
    /// Copy of the current page
    page: Vec<u8>,
    pos: usize,
    done: bool,
}

impl<'e> ConformerIter<'e> {
    /// Start a traversal inside `txn`
    pub fn new(tables: Tables, txn: RoTxn<'e>, cid: Cid) -> Result<Self> {
        let page_count = if cid > MAX_CID {
            0
        } else {
            tables.page_count(&txn, cid)?
        };
        Ok(Self {
            tables,
            txn,
            cid,
            page_count,
            next_page: 0,
            page: Vec::new(),
            pos: 0,
            done: page_count == 0,
        })
    }

    /// CID being traversed
    pub fn cid(&self) -> Cid {
        self.cid
    }

    /// Number of pages in the list
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    fn load_next_page(&mut self) -> Result<bool> {
        if self.next_page >= self.page_count {
            return Ok(false);
        }
        let page_no = self.next_page;
        let blob = self
            .tables
            .page(&self.txn, self.cid, page_no)?
            .ok_or_else(|| missing_page(self.cid, page_no, self.page_count))?;
        page_len(blob)?;
        self.page.clear();
        self.page.extend_from_slice(blob);
        self.pos = 0;
        self.next_page += 1;
        Ok(true)
    }

    fn next_hit(&mut self) -> Result<Option<IndexHit>> {
        while self.pos >= self.page.len() {
            if !self.load_next_page()? {
                return Ok(None);
            }
        }
        let alid = Alid::from_slice(&self.page[self.pos..self.pos + ALID_LEN])?;
        self.pos += ALID_LEN;
        match self
            .tables
            .record_by_alid(&self.txn, RecordKind::Conformer, &alid)?
        {
            Some(hit) => Ok(Some(hit)),
            None => Err(IndexError::corruption(format!(
                "posting list of CID {} names {} which has no conformer record",
                self.cid, alid
            ))),
        }
    }
}

impl Iterator for ConformerIter<'_> {
    type Item = Result<IndexHit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_hit() {
            Ok(Some(hit)) => Some(Ok(hit)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::fmt::Debug for ConformerIter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConformerIter")
            .field("cid", &self.cid)
            .field("page_count", &self.page_count)
            .field("next_page", &self.next_page)
            .finish()
    }
}
