//! Chunked batch lookups

use crate::common::*;

#[test]
fn ten_thousand_keys_with_one_percent_misses() {
    let fx = Fixture::new();
    let present: Vec<Cid> = (1..=10_000u64).filter(|cid| cid % 100 != 0).collect();
    fx.write("compound_bulk.sdf", compound_file(present.iter().copied()));
    fx.build();
    let index = fx.open();

    let keys: Vec<LookupKey> = (1..=10_000u64).map(LookupKey::Cid).collect();
    let batch = index.batch_lookup(keys.clone(), Some(1000));
    let entries: Vec<_> = batch.map(|e| e.unwrap()).collect();

    assert_eq!(entries.len(), 10_000);
    let mut misses = 0;
    for (entry, key) in entries.iter().zip(&keys) {
        assert_eq!(&entry.key, key, "results come back in input order");
        let LookupKey::Cid(cid) = key else { unreachable!() };
        match &entry.hit {
            Some(hit) => assert_eq!(hit.locator.cid, Some(*cid)),
            None => {
                assert_eq!(cid % 100, 0);
                misses += 1;
            }
        }
    }
    assert_eq!(misses, 100);
}

#[test]
fn batch_counts_chunks() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file(1..=10));
    fx.build();
    let index = fx.open();

    let mut batch = index.batch_lookup((1..=10u64).map(LookupKey::Cid), Some(3));
    let mut seen = 0;
    for entry in batch.by_ref() {
        assert!(entry.unwrap().hit.is_some());
        seen += 1;
    }
    assert_eq!(seen, 10);
    assert_eq!(batch.chunks(), 4);
}

#[test]
fn mixed_kinds_and_duplicate_keys() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1, 2]));
    fx.write("conformer_a.sdf", conformer_file([("c1", 1), ("c2", 2)]));
    fx.build();
    let index = fx.open();

    let keys = vec![
        LookupKey::ConformerId("c2".into()),
        LookupKey::Cid(1),
        LookupKey::Cid(1),
        LookupKey::ConformerId("missing".into()),
        LookupKey::Cid(u64::MAX),
    ];
    let entries: Vec<_> = index
        .batch_lookup(keys.clone(), Some(2))
        .map(|e| e.unwrap())
        .collect();

    assert_eq!(entries.iter().map(|e| e.key.clone()).collect::<Vec<_>>(), keys);
    assert_eq!(entries[0].hit.unwrap().locator.cid, Some(2));
    assert_eq!(entries[1].hit, entries[2].hit);
    assert!(entries[3].hit.is_none());
    assert!(entries[4].hit.is_none());
}

#[test]
fn typed_batch_helpers() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([5, 6]));
    fx.write("conformer_a.sdf", conformer_file([("x", 5)]));
    fx.build();
    let index = fx.open();

    let compounds: Vec<_> = index.batch_compounds([6, 7]).map(|e| e.unwrap()).collect();
    assert!(compounds[0].hit.is_some());
    assert!(compounds[1].hit.is_none());

    let conformers: Vec<_> = index.batch_conformers(["x", "y"]).map(|e| e.unwrap()).collect();
    assert_eq!(conformers[0].hit.unwrap().locator.cid, Some(5));
    assert!(conformers[1].hit.is_none());
}

#[test]
fn empty_batch_yields_nothing() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1]));
    fx.build();
    let index = fx.open();

    let mut batch = index.batch_lookup(Vec::<LookupKey>::new(), None);
    assert!(batch.next().is_none());
    assert_eq!(batch.chunks(), 0);
}
