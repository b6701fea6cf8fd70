//! Run segmentation tests.

use pulldown::{FlagRecord, FlagStore, Run, RunKind, group_by_contiguous_index, segment};

fn store_from_pattern(pattern: &str) -> FlagStore {
    let records = pattern.chars().map(|c| FlagRecord {
        progressive: c == 'P',
        top_field_first: true,
        ..FlagRecord::default()
    });
    FlagStore::from_records(records).expect("Failed to build store")
}

#[test]
fn alternating_runs() {
    let store = store_from_pattern("PPPIIPIII");
    let runs = segment::segment(store.flags());

    assert_eq!(
        runs,
        vec![
            Run { kind: RunKind::Progressive, start: 0, end: 2 },
            Run { kind: RunKind::Interlaced, start: 3, end: 4 },
            Run { kind: RunKind::Progressive, start: 5, end: 5 },
            Run { kind: RunKind::Interlaced, start: 6, end: 8 },
        ]
    );
}

#[test]
fn runs_cover_every_position_once() {
    let store = store_from_pattern("IPPIPIIIPPPPIP");
    let runs = segment::segment(store.flags());

    let covered: Vec<usize> = runs.iter().flat_map(|run| run.positions()).collect();
    assert_eq!(covered, (0..store.len()).collect::<Vec<_>>());
    assert_eq!(runs.iter().map(Run::len).sum::<usize>(), store.len());
    for pair in runs.windows(2) {
        assert_ne!(pair[0].kind, pair[1].kind, "adjacent runs must alternate");
        assert_eq!(pair[0].end + 1, pair[1].start);
    }
}

#[test]
fn single_kind_is_one_run() {
    let store = store_from_pattern("IIIII");
    let runs = segment::segment(store.flags());
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].len(), 5);
    assert!(!runs[0].is_progressive());
}

#[test]
fn empty_slice_has_no_runs() {
    assert!(segment::segment(&[]).is_empty());
}

#[test]
fn contiguous_index_groups() {
    assert_eq!(
        group_by_contiguous_index([7, 1, 2, 3, 9, 8]),
        vec![1..=3, 7..=9]
    );
    assert_eq!(group_by_contiguous_index([4, 4, 5]), vec![4..=5]);
    assert_eq!(group_by_contiguous_index([10]), vec![10..=10]);
    assert!(group_by_contiguous_index(Vec::<usize>::new()).is_empty());
}
