//! Byte-exact reads and build determinism

use crate::common::*;

fn mixed_tree(fx: &Fixture) {
    fx.write("a/compound_001.sdf", compound_file(1..=40));
    fx.write("b/compound_002.sdf", compound_file(41..=80));
    let conformers: Vec<(String, Cid)> = (0..300).map(|i| (format!("k{i}"), 1 + i % 80)).collect();
    fx.write(
        "a/conformer_001.sdf",
        conformer_file(conformers[..150].iter().map(|(id, cid)| (id.as_str(), *cid))),
    );
    fx.write(
        "c/conformer_002.sdf",
        conformer_file(conformers[150..].iter().map(|(id, cid)| (id.as_str(), *cid))),
    );
}

fn source_span(fx: &Fixture, index: &SdfIndex, locator: &RecordLocator) -> Vec<u8> {
    let path = index.reader().file_path(locator.file_id).unwrap();
    let relative = path.strip_prefix(index.root()).unwrap().to_string_lossy().into_owned();
    let bytes = fx.source(&relative);
    bytes[locator.start as usize..locator.end as usize].to_vec()
}

#[test]
fn every_record_reads_back_byte_identical() {
    let fx = Fixture::new();
    mixed_tree(&fx);
    let report = fx.build();
    let index = fx.open();

    let hits = all_hits(&index);
    assert_eq!(hits.len() as u64, report.counts.total_records());
    for hit in hits {
        let bytes = index.read(&hit.locator).unwrap();
        assert_eq!(bytes, source_span(&fx, &index, &hit.locator));
        assert!(bytes.ends_with(b"$$$$\n"));
    }
}

#[test]
fn record_spans_tile_each_file() {
    let fx = Fixture::new();
    fx.write("compound_only.sdf", compound_file(1..=25));
    fx.build();
    let index = fx.open();

    let mut spans: Vec<(u64, u64)> = all_hits(&index)
        .iter()
        .map(|h| (h.locator.start, h.locator.end))
        .collect();
    spans.sort();
    assert_eq!(spans[0].0, 0);
    for pair in spans.windows(2) {
        assert_eq!(pair[0].1, pair[1].0, "records are contiguous");
    }
    assert_eq!(spans.last().unwrap().1, fx.source("compound_only.sdf").len() as u64);
}

#[test]
fn crlf_records_keep_their_line_endings() {
    let fx = Fixture::new();
    let text = compound_file([10, 20]).replace('\n', "\r\n");
    fx.write("compound_crlf.sdf", &text);
    let report = fx.build();
    assert_eq!(report.counts.compound_records, 2);

    let index = fx.open();
    let hit = index.lookup_compound(20).unwrap().unwrap();
    let bytes = index.read(&hit.locator).unwrap();
    assert!(bytes.ends_with(b"$$$$\r\n"));
    assert_eq!(hit.locator.end, text.len() as u64);
    assert_eq!(record_cid(&String::from_utf8(bytes).unwrap()), Some(20));
}

#[test]
fn rebuilds_are_deterministic() {
    let fx = Fixture::new();
    mixed_tree(&fx);
    fx.build();
    let first = all_hits(&fx.open());

    let other = tempfile::tempdir().unwrap();
    SdfIndex::build(fx.root_path(), other.path(), &fx.config).unwrap();
    let second_index = SdfIndex::open(other.path(), &fx.config).unwrap();
    assert_eq!(first, all_hits(&second_index));

    fx.build();
    assert_eq!(first, all_hits(&fx.open()));
}

#[test]
fn parallel_scan_matches_sequential_build() {
    let fx = Fixture::new();
    mixed_tree(&fx);
    fx.build();
    let sequential = fx.open();

    let mut parallel_config = fx.config.clone();
    parallel_config.build.parallel_scan = true;
    parallel_config.build.scan_window = 3;
    let other = tempfile::tempdir().unwrap();
    let report = SdfIndex::build(fx.root_path(), other.path(), &parallel_config).unwrap();
    assert!(report.parallel_scan);
    let parallel = SdfIndex::open(other.path(), &parallel_config).unwrap();

    assert_eq!(all_hits(&sequential), all_hits(&parallel));
    assert_eq!(sequential.meta().unwrap().counts, parallel.meta().unwrap().counts);
    for cid in 1..=80 {
        let a: Vec<IndexHit> = sequential.conformers_of(cid).unwrap().map(|h| h.unwrap()).collect();
        let b: Vec<IndexHit> = parallel.conformers_of(cid).unwrap().map(|h| h.unwrap()).collect();
        assert_eq!(a, b, "posting order of CID {cid}");
    }
}

#[test]
fn posting_spills_do_not_change_results() {
    let fx = Fixture::new();
    mixed_tree(&fx);
    fx.build();
    let baseline = fx.open();

    let mut tiny = fx.config.clone();
    tiny.build.posting_buffer_limit = 2;
    let other = tempfile::tempdir().unwrap();
    SdfIndex::build(fx.root_path(), other.path(), &tiny).unwrap();
    let spilled = SdfIndex::open(other.path(), &tiny).unwrap();

    for cid in 1..=80 {
        let a: Vec<IndexHit> = baseline.conformers_of(cid).unwrap().map(|h| h.unwrap()).collect();
        let b: Vec<IndexHit> = spilled.conformers_of(cid).unwrap().map(|h| h.unwrap()).collect();
        assert_eq!(a, b);
        assert_eq!(baseline.posting_stats(cid).unwrap(), spilled.posting_stats(cid).unwrap());
    }
}

#[test]
fn identifiers_are_stable_across_index_locations() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([3]));
    fx.build();
    let hit = fx.open().lookup_compound(3).unwrap().unwrap();

    let expected = Alid::generate(RecordKind::Compound, "compound_a.sdf", 0, Some("3"));
    assert_eq!(hit.alid, expected);
}
