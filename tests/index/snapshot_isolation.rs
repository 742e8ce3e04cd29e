//! Readers keep their snapshot while a rebuild commits

use crate::common::*;

#[test]
fn open_traversal_survives_rebuild() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1, 2]));
    fx.write(
        "conformer_a.sdf",
        conformer_file([("c1", 2), ("c2", 2), ("c3", 2), ("c4", 2), ("c5", 2)]),
    );
    fx.build();

    let index = fx.open();
    let mut traversal = index.conformers_of(2).unwrap();
    let first = traversal.next().unwrap().unwrap();

    fx.write("conformer_a.sdf", conformer_file([("n1", 2)]));
    fx.build();

    let rest: Vec<IndexHit> = traversal.map(|h| h.unwrap()).collect();
    assert_eq!(rest.len(), 4, "old generation stays visible to the open traversal");
    assert!(rest.iter().all(|h| h.alid != first.alid));

    let fresh: Vec<IndexHit> = index.conformers_of(2).unwrap().map(|h| h.unwrap()).collect();
    assert_eq!(fresh.len(), 1);
    assert!(index.lookup_conformer("c1").unwrap().is_none());
    assert!(index.lookup_conformer("n1").unwrap().is_some());
}

#[test]
fn read_txn_sees_one_generation() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1]));
    fx.build();

    let index = fx.open();
    let env = index.env();
    let txn = env.read_txn().unwrap();
    let before = env.tables().record_count(&txn).unwrap();

    fx.write("compound_a.sdf", compound_file([1, 2, 3]));
    fx.build();

    assert_eq!(env.tables().record_count(&txn).unwrap(), before);
    assert!(env.tables().compound_key(&txn, 3).unwrap().is_none());
    drop(txn);

    assert_eq!(index.meta().unwrap().counts.compound_records, 3);
    assert!(index.lookup_compound(3).unwrap().is_some());
}

#[test]
fn queries_from_threads_during_build() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file(1..=200));
    fx.build();
    let index = fx.open();

    std::thread::scope(|s| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    for _ in 0..50 {
                        let _ = index.lookup_compound(1).unwrap();
                        let meta = index.meta().unwrap();
                        assert_eq!(meta.schema_version, 1);
                    }
                })
            })
            .collect();
        fx.build();
        for reader in readers {
            reader.join().unwrap();
        }
    });
}
