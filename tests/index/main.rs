//! Index Property Tests
//!
//! End-to-end behaviour of a built index: lookups, posting lists, batches,
//! byte-exact reads, build policies and snapshot isolation.

#[path = "../common/mod.rs"]
mod common;

mod batch;
mod build_policies;
mod errors;
mod lookups;
mod pagination;
mod record_bytes;
mod snapshot_isolation;
