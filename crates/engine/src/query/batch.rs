//! Chunked batch lookups
//!
//! [`BatchLookup`] pulls at most `chunk_size` keys from its input, resolves
//! them inside one read transaction, ends that transaction and hands the
//! results out in input order. Memory and reader-slot use stay bounded however
//! long the input is. Each chunk is a consistent snapshot; chunks taken while
//! a rebuild commits may see different generations.

use super::point::lookup_key;
use sdfdex_core::{IndexHit, LookupKey, Result};
use sdfdex_storage::IndexEnv;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::trace;

/// Result for one input key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    /// The key as given
    pub key: LookupKey,
    /// Resolved record, `None` on a miss
    pub hit: Option<IndexHit>,
}

/// Iterator of batch results, one per input key
pub struct BatchLookup<'e, I> {
    env: &'e IndexEnv,
    keys: I,
    chunk_size: usize,
    ready: VecDeque<BatchEntry>,
    chunks: u64,
    done: bool,
}

impl<'e, I> BatchLookup<'e, I>
where
    I: Iterator<Item = LookupKey>,
{
    /// Lookup over `keys`, resolving `chunk_size` keys per transaction
    pub fn new(env: &'e IndexEnv, keys: I, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            env,
            keys,
            chunk_size,
            ready: VecDeque::with_capacity(chunk_size),
            chunks: 0,
            done: false,
        }
    }

    /// Chunks resolved so far
    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    fn fill(&mut self) -> Result<()> {
        let chunk: Vec<LookupKey> = self.keys.by_ref().take(self.chunk_size).collect();
        if chunk.is_empty() {
            self.done = true;
            return Ok(());
        }
        let tables = self.env.tables();
        let txn = self.env.read_txn()?;
        for key in chunk {
            let hit = lookup_key(tables, &txn, &key)?;
            self.ready.push_back(BatchEntry { key, hit });
        }
        drop(txn);
        self.chunks += 1;
        trace!(target: "sdfdex::query", chunk = self.chunks, keys = self.ready.len(), "Resolved batch chunk");
        Ok(())
    }
}

impl<I> Iterator for BatchLookup<'_, I>
where
    I: Iterator<Item = LookupKey>,
{
    type Item = Result<BatchEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(entry) = self.ready.pop_front() {
            return Some(Ok(entry));
        }
        if self.done {
            return None;
        }
        if let Err(e) = self.fill() {
            self.done = true;
            self.ready.clear();
            return Some(Err(e));
        }
        self.ready.pop_front().map(Ok)
    }
}

impl<I> std::fmt::Debug for BatchLookup<'_, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLookup")
            .field("chunk_size", &self.chunk_size)
            .field("chunks", &self.chunks)
            .field("buffered", &self.ready.len())
            .finish()
    }
}
