//! Build-time policies: duplicates, skipped files, malformed input

use crate::common::*;

fn duplicate_tree(fx: &Fixture) {
    fx.write("compound_a.sdf", compound_file([5, 6]));
    fx.write("compound_b.sdf", compound_file([5]));
    fx.write("conformer_a.sdf", conformer_file([("dup", 5)]));
    fx.write("conformer_b.sdf", conformer_file([("dup", 6)]));
}

fn file_of(index: &SdfIndex, hit: &IndexHit) -> String {
    let path = index.reader().file_path(hit.locator.file_id).unwrap();
    path.file_name().unwrap().to_string_lossy().into_owned()
}

#[test]
fn keep_first_is_the_default_policy() {
    let fx = Fixture::new();
    assert_eq!(fx.config.build.duplicate_policy, DuplicatePolicy::KeepFirst);
    duplicate_tree(&fx);
    let report = fx.build();

    assert_eq!(report.counts.duplicate_cids, 1);
    assert_eq!(report.counts.duplicate_conformer_ids, 1);
    assert_eq!(report.counts.compound_records, 3, "duplicates are still stored");

    let index = fx.open();
    let compound = index.lookup_compound(5).unwrap().unwrap();
    assert_eq!(file_of(&index, &compound), "compound_a.sdf");
    let conformer = index.lookup_conformer("dup").unwrap().unwrap();
    assert_eq!(conformer.locator.cid, Some(5));
}

#[test]
fn keep_last_replaces_the_key() {
    let mut fx = Fixture::new();
    fx.config.build.duplicate_policy = DuplicatePolicy::KeepLast;
    duplicate_tree(&fx);
    let report = fx.build();
    assert_eq!(report.counts.duplicate_cids, 1);
    assert_eq!(report.counts.duplicate_conformer_ids, 1);

    let index = fx.open();
    let compound = index.lookup_compound(5).unwrap().unwrap();
    assert_eq!(file_of(&index, &compound), "compound_b.sdf");
    let conformer = index.lookup_conformer("dup").unwrap().unwrap();
    assert_eq!(conformer.locator.cid, Some(6));
}

#[test]
fn duplicate_conformers_stay_in_posting_lists() {
    let fx = Fixture::new();
    duplicate_tree(&fx);
    fx.build();
    let index = fx.open();

    assert_eq!(index.conformers_of(5).unwrap().count(), 1);
    assert_eq!(index.conformers_of(6).unwrap().count(), 1);
}

#[test]
fn truncated_tail_is_dropped_and_counted() {
    let fx = Fixture::new();
    let mut text = compound_file([1, 2]);
    text.push_str("3\n  sdfdex-test\n\nM  END\n> <PUBCHEM_COMPOUND_CID>\n3\n");
    fx.write("compound_cut.sdf", &text);
    let report = fx.build();

    assert_eq!(report.counts.compound_records, 2);
    assert_eq!(report.counts.truncated_records, 1);
    let index = fx.open();
    assert!(index.lookup_compound(2).unwrap().is_some());
    assert!(index.lookup_compound(3).unwrap().is_none());
}

#[test]
fn unclassified_and_foreign_files_are_skipped() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1]));
    fx.write("notes.sdf", compound_file([2]));
    fx.write("compound_readme.txt", "not a record file");
    fx.write("nested/deeper/CONFORMER_X.SDF", conformer_file([("up", 1)]));
    let report = fx.build();

    assert_eq!(report.counts.files, 2);
    assert_eq!(report.counts.skipped_files, 1);
    let index = fx.open();
    assert!(index.lookup_compound(2).unwrap().is_none());
    assert_eq!(index.lookup_conformer("up").unwrap().unwrap().locator.cid, Some(1));
}

#[test]
fn records_without_keys_are_stored_unkeyed() {
    let fx = Fixture::new();
    let mut compounds = compound_record(None);
    compounds.push_str(&compound_file([4]));
    fx.write("compound_a.sdf", compounds);
    let mut conformers = conformer_record(None, Some(4));
    conformers.push_str(&conformer_record(Some("orphan"), None));
    fx.write("conformer_a.sdf", conformers);
    let report = fx.build();

    assert_eq!(report.counts.compound_records, 2);
    assert_eq!(report.counts.conformer_records, 2);
    assert_eq!(report.counts.unkeyed_records, 2);

    let index = fx.open();
    assert_eq!(all_hits(&index).len(), 4);
    assert_eq!(index.conformers_of(4).unwrap().count(), 1, "unkeyed conformer still posted");
    let orphan = index.lookup_conformer("orphan").unwrap().unwrap();
    assert_eq!(orphan.locator.cid, None);
}

#[test]
fn oversized_conformer_id_is_stored_unkeyed() {
    let fx = Fixture::new();
    let long_id = "L".repeat(600);
    fx.write("conformer_a.sdf", conformer_record(Some(&long_id), Some(8)));
    let report = fx.build();

    assert_eq!(report.counts.conformer_records, 1);
    assert_eq!(report.counts.unkeyed_records, 1);
    let index = fx.open();
    assert!(index.lookup_conformer(&long_id).unwrap().is_none());
    assert_eq!(index.conformers_of(8).unwrap().count(), 1);
}

#[test]
fn rebuild_replaces_previous_generation() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1, 2]));
    fx.build();

    std::fs::remove_file(fx.root_path().join("compound_a.sdf")).unwrap();
    fx.write("compound_b.sdf", compound_file([9]));
    let report = fx.build();
    assert_eq!(report.counts.compound_records, 1);

    let index = fx.open();
    assert!(index.lookup_compound(1).unwrap().is_none());
    assert!(index.lookup_compound(9).unwrap().is_some());
    assert_eq!(all_hits(&index).len(), 1);
}

#[test]
fn custom_delimiter() {
    let mut fx = Fixture::new();
    fx.config.build.delimiter = "////".into();
    fx.write("compound_a.sdf", compound_file([1, 2]).replace("$$$$", "////"));
    let report = fx.build();
    assert_eq!(report.counts.compound_records, 2);
    assert_eq!(fx.open().meta().unwrap().delimiter, "////");
}

#[test]
fn empty_tree_builds_an_empty_index() {
    let fx = Fixture::new();
    let report = fx.build();
    assert_eq!(report.counts.total_records(), 0);

    let index = fx.open();
    assert!(index.meta().unwrap().complete);
    assert!(index.lookup_compound(1).unwrap().is_none());
}
