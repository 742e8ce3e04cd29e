//! Point lookups and conformer traversal on a small tree

use crate::common::*;

/// Compounds {1, 2, 3}; c1..c5 belong to CID 2, c6 and c7 to CID 3.
fn small_tree() -> Fixture {
    let fx = Fixture::new();
    fx.write("compounds/compound_0001.sdf", compound_file([1, 2, 3]));
    fx.write(
        "conformers/conformer_0001.sdf",
        conformer_file([("c1", 2), ("c2", 2), ("c3", 2), ("c4", 2), ("c5", 2)]),
    );
    fx.write("conformers/conformer_0002.sdf", conformer_file([("c6", 3), ("c7", 3)]));
    fx
}

#[test]
fn build_counts_match_tree() {
    let fx = small_tree();
    let report = fx.build();

    assert_eq!(report.counts.files, 3);
    assert_eq!(report.counts.compound_records, 3);
    assert_eq!(report.counts.conformer_records, 7);
    assert_eq!(report.counts.posting_cids, 2);
    assert_eq!(report.counts.posting_pages, 2);
    assert_eq!(report.counts.skipped_files, 0);

    let meta = fx.open().meta().unwrap();
    assert!(meta.complete);
    assert_eq!(meta.counts, report.counts);
}

#[test]
fn compound_lookup_returns_its_record() {
    let fx = small_tree();
    fx.build();
    let index = fx.open();

    for cid in 1..=3 {
        let hit = index.lookup_compound(cid).unwrap().expect("compound indexed");
        assert_eq!(hit.locator.kind, RecordKind::Compound);
        assert_eq!(hit.locator.cid, Some(cid));
        let text = index.reader().read_text(&hit.locator).unwrap();
        assert_eq!(record_cid(&text), Some(cid));
    }
    assert!(index.lookup_compound(4).unwrap().is_none());
}

#[test]
fn conformers_of_lists_children_in_file_order() {
    let fx = small_tree();
    fx.build();
    let index = fx.open();

    let ids: Vec<String> = index
        .conformers_of(2)
        .unwrap()
        .map(|hit| {
            let hit = hit.unwrap();
            record_conformer_id(&index.reader().read_text(&hit.locator).unwrap()).unwrap()
        })
        .collect();
    assert_eq!(ids, vec!["c1", "c2", "c3", "c4", "c5"]);

    assert_eq!(index.conformers_of(3).unwrap().count(), 2);
    assert_eq!(index.conformers_of(1).unwrap().count(), 0);
    assert_eq!(index.posting_stats(1).unwrap().page_count, 0);
}

#[test]
fn conformer_lookup_carries_parent_cid() {
    let fx = small_tree();
    fx.build();
    let index = fx.open();

    let hit = index.lookup_conformer("c6").unwrap().expect("conformer indexed");
    assert_eq!(hit.locator.kind, RecordKind::Conformer);
    assert_eq!(hit.locator.cid, Some(3));
    assert!(index.lookup_conformer("c99").unwrap().is_none());
}

#[test]
fn get_by_alid_respects_kind() {
    let fx = small_tree();
    fx.build();
    let index = fx.open();

    let compound = index.lookup_compound(2).unwrap().unwrap();
    assert_eq!(index.get_by_alid(&compound.alid, None).unwrap(), Some(compound));
    assert_eq!(
        index.get_by_alid(&compound.alid, Some(RecordKind::Compound)).unwrap(),
        Some(compound)
    );
    assert!(index
        .get_by_alid(&compound.alid, Some(RecordKind::Conformer))
        .unwrap()
        .is_none());

    let conformer = index.lookup_conformer("c1").unwrap().unwrap();
    assert_eq!(index.get_by_alid(&conformer.alid, None).unwrap(), Some(conformer));
}

#[test]
fn every_conformer_points_back_to_its_cid() {
    let fx = small_tree();
    fx.build();
    let index = fx.open();

    for cid in [2, 3] {
        let stats = index.posting_stats(cid).unwrap();
        let hits: Vec<IndexHit> = index.conformers_of(cid).unwrap().map(|h| h.unwrap()).collect();
        assert_eq!(stats.entries, hits.len() as u64);

        let mut alids: Vec<Alid> = hits.iter().map(|h| h.alid).collect();
        alids.sort();
        alids.dedup();
        assert_eq!(alids.len(), hits.len(), "posting entries are distinct");

        for hit in hits {
            assert_eq!(hit.locator.cid, Some(cid));
            let text = index.reader().read_text(&hit.locator).unwrap();
            assert_eq!(record_cid(&text), Some(cid));
        }
    }
}

#[test]
fn out_of_range_keys_are_misses() {
    let fx = small_tree();
    fx.build();
    let index = fx.open();

    assert!(index.lookup_compound(u64::MAX).unwrap().is_none());
    assert!(index.lookup_conformer("").unwrap().is_none());
    assert!(index.lookup_conformer(&"x".repeat(600)).unwrap().is_none());
    assert_eq!(index.conformers_of(u64::MAX).unwrap().count(), 0);
}

#[test]
fn open_with_root_reads_moved_tree() {
    let fx = small_tree();
    fx.build();

    let moved = tempfile::tempdir().unwrap();
    for relative in ["compounds/compound_0001.sdf", "conformers/conformer_0001.sdf"] {
        let dest = moved.path().join(relative);
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(dest, fx.source(relative)).unwrap();
    }

    let index = SdfIndex::open_with_root(fx.index_path(), moved.path(), &fx.config).unwrap();
    assert_eq!(index.root(), moved.path());
    let hit = index.lookup_compound(1).unwrap().unwrap();
    let text = index.reader().read_text(&hit.locator).unwrap();
    assert_eq!(record_cid(&text), Some(1));
}
