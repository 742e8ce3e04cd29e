//! Point lookups
//!
//! Each function resolves one key inside the caller's transaction, so a batch
//! can resolve many keys against one snapshot. A unique-key index entry whose
//! records entry is missing means the index is damaged and is reported as
//! corruption; a missing key is `Ok(None)`.

use sdfdex_core::{validate_key, Alid, Cid, IndexError, IndexHit, LookupKey, RecordKind, Result, MAX_CID};
use sdfdex_storage::{RecordKey, RoTxn, Tables};

fn resolve(tables: &Tables, txn: &RoTxn<'_>, key: RecordKey, via: &dyn std::fmt::Display) -> Result<IndexHit> {
    tables.record(txn, &key)?.ok_or_else(|| {
        IndexError::corruption(format!(
            "{} points at identifier {} which has no record",
            via,
            key.alid()
        ))
    })
}

/// Compound record with this CID
pub fn lookup_compound(tables: &Tables, txn: &RoTxn<'_>, cid: Cid) -> Result<Option<IndexHit>> {
    if cid > MAX_CID {
        return Ok(None);
    }
    match tables.compound_key(txn, cid)? {
        Some(key) => resolve(tables, txn, key, &format_args!("CID {}", cid)).map(Some),
        None => Ok(None),
    }
}

/// Conformer record with this conformer id
pub fn lookup_conformer(tables: &Tables, txn: &RoTxn<'_>, conformer_id: &str) -> Result<Option<IndexHit>> {
    // Ids that cannot be stored as keys were never indexed.
    if validate_key(conformer_id.as_bytes()).is_err() {
        return Ok(None);
    }
    match tables.conformer_key(txn, conformer_id)? {
        Some(key) => resolve(
            tables,
            txn,
            key,
            &format_args!("conformer id '{}'", conformer_id),
        )
        .map(Some),
        None => Ok(None),
    }
}

/// Record with this identifier; without a kind, compounds are tried first
pub fn get_by_alid(tables: &Tables, txn: &RoTxn<'_>, alid: &Alid, kind: Option<RecordKind>) -> Result<Option<IndexHit>> {
    match kind {
        Some(kind) => tables.record_by_alid(txn, kind, alid),
        None => match tables.record_by_alid(txn, RecordKind::Compound, alid)? {
            Some(hit) => Ok(Some(hit)),
            None => tables.record_by_alid(txn, RecordKind::Conformer, alid),
        },
    }
}

/// Resolve either kind of lookup key
pub fn lookup_key(tables: &Tables, txn: &RoTxn<'_>, key: &LookupKey) -> Result<Option<IndexHit>> {
    match key {
        LookupKey::Cid(cid) => lookup_compound(tables, txn, *cid),
        LookupKey::ConformerId(id) => lookup_conformer(tables, txn, id),
    }
}
