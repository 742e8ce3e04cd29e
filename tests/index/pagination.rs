//! Posting lists spanning several pages

use crate::common::*;

fn many_conformers(fx: &Fixture, cid: Cid, n: usize) {
    let records: String = (0..n)
        .map(|i| conformer_record(Some(&format!("{cid}-{i:05}")), Some(cid)))
        .collect();
    fx.write("conformer_many.sdf", records);
}

#[test]
fn one_past_page_capacity_spills_into_second_page() {
    let fx = Fixture::new();
    many_conformers(&fx, 7, 4097);
    let report = fx.build();
    assert_eq!(report.counts.posting_pages, 2);

    let index = fx.open();
    let stats = index.posting_stats(7).unwrap();
    assert_eq!(stats.page_count, 2);
    assert_eq!(stats.entries, 4097);

    let iter = index.conformers_of(7).unwrap();
    assert_eq!(iter.page_count(), 2);
    let hits: Vec<IndexHit> = iter.map(|h| h.unwrap()).collect();
    assert_eq!(hits.len(), 4097);

    let mut alids: Vec<Alid> = hits.iter().map(|h| h.alid).collect();
    alids.sort();
    alids.dedup();
    assert_eq!(alids.len(), 4097);

    let last = index.reader().read_text(&hits[4096].locator).unwrap();
    assert_eq!(record_conformer_id(&last).as_deref(), Some("7-04096"));
}

#[test]
fn exactly_page_capacity_fits_one_page() {
    let fx = Fixture::new();
    many_conformers(&fx, 9, 4096);
    fx.build();

    let index = fx.open();
    let stats = index.posting_stats(9).unwrap();
    assert_eq!(stats.page_count, 1);
    assert_eq!(stats.entries, 4096);
    assert_eq!(index.conformers_of(9).unwrap().count(), 4096);
}

#[test]
fn pages_survive_small_commit_batches() {
    let mut fx = Fixture::new();
    fx.config.build.commit_every = 100;
    fx.config.build.posting_buffer_limit = 1000;
    many_conformers(&fx, 11, 5000);
    fx.build();

    let index = fx.open();
    let stats = index.posting_stats(11).unwrap();
    assert_eq!(stats.page_count, 2);
    assert_eq!(stats.entries, 5000);

    let ids: Vec<String> = index
        .conformers_of(11)
        .unwrap()
        .map(|h| {
            let hit = h.unwrap();
            record_conformer_id(&index.reader().read_text(&hit.locator).unwrap()).unwrap()
        })
        .collect();
    let expected: Vec<String> = (0..5000).map(|i| format!("11-{i:05}")).collect();
    assert_eq!(ids, expected);
}
