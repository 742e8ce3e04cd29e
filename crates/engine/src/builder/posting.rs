//! CID -> conformer posting list writer
//!
//! Each CID has an open page in memory. A page that reaches
//! [`POSTING_PAGE_CAPACITY`] entries is written as a sealed page right away.
//! When the entries buffered across all CIDs exceed the buffer limit, every
//! open page is spilled to the store as its CID's unsealed tail page
//! (`page_no == sealed_pages`) and its buffer is released; the next flush of
//! that CID reads the tail back and appends to it. Page headers are written
//! once, by [`PostingWriter::finish`].
//!
//! Between flushes a CID costs only its [`PageProgress`]; buffers exist only
//! for CIDs with unwritten entries.
//!
//! Entries are appended in build order, so a CID's pages list its conformers
//! in the order the builder met them.

use sdfdex_core::{Alid, Cid, IndexError, Result, ALID_LEN, POSTING_PAGE_CAPACITY};
use sdfdex_storage::{RwTxn, Tables};
use std::collections::HashMap;
use tracing::debug;

/// Pages of one CID already in the store
#[derive(Debug, Clone, Copy, Default)]
struct PageProgress {
    /// Full pages written
    sealed_pages: u32,
    /// Entries of the unsealed tail page, always below the page capacity
    stored_tail: u16,
}

impl PageProgress {
    fn page_count(&self) -> u32 {
        self.sealed_pages + u32::from(self.stored_tail > 0)
    }
}

/// Totals reported when the posting lists are finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostingTotals {
    /// CIDs with at least one entry
    pub cids: u64,
    /// Pages across all CIDs
    pub pages: u64,
    /// Entries across all CIDs
    pub entries: u64,
}

/// Buffered, paged posting list writer
#[derive(Debug)]
pub struct PostingWriter {
    tables: Tables,
    progress: HashMap<Cid, PageProgress>,
    /// Unwritten entries per CID, as concatenated identifiers
    open: HashMap<Cid, Vec<u8>>,
    buffered: usize,
    buffer_limit: usize,
    entries: u64,
    spills: u64,
}

impl PostingWriter {
    /// Writer holding at most about `buffer_limit` entries in memory
    pub fn new(tables: Tables, buffer_limit: usize) -> Self {
        Self {
            tables,
            progress: HashMap::new(),
            open: HashMap::new(),
            buffered: 0,
            buffer_limit,
            entries: 0,
            spills: 0,
        }
    }

    /// Entries currently held in memory
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Append a conformer to the posting list of `cid`
    pub fn push(&mut self, wtxn: &mut RwTxn<'_>, cid: Cid, alid: &Alid) -> Result<()> {
        let open = self.open.entry(cid).or_default();
        open.extend_from_slice(alid.as_bytes());
        let open_len = open.len() / ALID_LEN;
        self.buffered += 1;
        self.entries += 1;

        let progress = self.progress.entry(cid).or_default();
        if usize::from(progress.stored_tail) + open_len >= POSTING_PAGE_CAPACITY {
            if let Some(open) = self.open.remove(&cid) {
                flush_list(&self.tables, wtxn, cid, progress, &open)?;
                self.buffered -= open_len;
            }
        }
        if self.buffered > self.buffer_limit {
            self.spill(wtxn)?;
        }
        Ok(())
    }

    /// Write every open page to the store as an unsealed tail page and
    /// release the buffers
    pub fn spill(&mut self, wtxn: &mut RwTxn<'_>) -> Result<()> {
        if self.buffered == 0 {
            return Ok(());
        }
        debug!(
            target: "sdfdex::build",
            entries = self.buffered,
            cids = self.open.len(),
            "Spilling posting buffer"
        );
        for (cid, open) in std::mem::take(&mut self.open) {
            let progress = self.progress.entry(cid).or_default();
            flush_list(&self.tables, wtxn, cid, progress, &open)?;
        }
        self.buffered = 0;
        self.spills += 1;
        Ok(())
    }

    /// Number of times the buffer was spilled
    pub fn spills(&self) -> u64 {
        self.spills
    }

    /// Flush everything and write the page count header of every CID
    pub fn finish(mut self, wtxn: &mut RwTxn<'_>) -> Result<PostingTotals> {
        self.spill(wtxn)?;
        let mut totals = PostingTotals {
            entries: self.entries,
            ..Default::default()
        };
        let mut cids: Vec<(Cid, PageProgress)> = self.progress.into_iter().collect();
        cids.sort_unstable_by_key(|(cid, _)| *cid);
        for (cid, progress) in cids {
            let pages = progress.page_count();
            self.tables.put_page_count(wtxn, cid, pages)?;
            totals.cids += 1;
            totals.pages += u64::from(pages);
        }
        Ok(totals)
    }

    #[cfg(test)]
    fn retained_bytes(&self) -> usize {
        self.open.values().map(Vec::capacity).sum()
    }
}

/// Write a CID's open entries, merging them into its stored tail page.
fn flush_list(
    tables: &Tables,
    wtxn: &mut RwTxn<'_>,
    cid: Cid,
    progress: &mut PageProgress,
    open: &[u8],
) -> Result<()> {
    let page_no = progress.sealed_pages;
    let stored_tail = usize::from(progress.stored_tail);
    let mut blob = if stored_tail > 0 {
        let stored = tables.page(wtxn, cid, page_no)?.ok_or_else(|| {
            IndexError::corruption(format!("posting tail page {} of CID {} is missing", page_no, cid))
        })?;
        let mut blob = Vec::with_capacity(stored.len() + open.len());
        blob.extend_from_slice(stored);
        blob
    } else {
        Vec::with_capacity(open.len())
    };
    blob.extend_from_slice(open);
    tables.put_page(wtxn, cid, page_no, &blob)?;

    let len = stored_tail + open.len() / ALID_LEN;
    if len >= POSTING_PAGE_CAPACITY {
        progress.sealed_pages += 1;
        progress.stored_tail = 0;
    } else {
        progress.stored_tail = len as u16;
    }
    Ok(())
}
