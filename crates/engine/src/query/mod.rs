//! Query engine: point lookups, conformer traversal, batch lookups

pub mod batch;
pub mod conformers;
pub mod point;

pub use batch::{BatchEntry, BatchLookup};
pub use conformers::{posting_stats, ConformerIter, PostingStats};
pub use point::{get_by_alid, lookup_compound, lookup_conformer, lookup_key};
