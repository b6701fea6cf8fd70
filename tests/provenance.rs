//! Frame provenance and group map tests.

use pulldown::{
    Classification, DecimationPhase, FieldOrder, FlagRecord, FlagStore, FrameRate,
    NormalizedSequence, PulldownError, VobIndexMap, tag,
};

fn record(progressive: bool, top_field_first: bool, group_id: u32) -> FlagRecord {
    FlagRecord {
        progressive,
        repeat_first_field: progressive && top_field_first,
        top_field_first,
        group_id,
        cell_id: group_id * 10,
    }
}

#[test]
fn one_tag_per_frame() {
    let store = FlagStore::from_records([
        record(true, true, 1),
        record(false, true, 1),
        record(false, false, 2),
    ])
    .expect("store");
    let tags = tag(store.flags());

    assert_eq!(tags.len(), 3);
    assert_eq!(tags.tags[0].classification(), Classification::Progressive);
    assert_eq!(tags.tags[0].field_order, None);
    assert_eq!(tags.tags[1].field_order, Some(FieldOrder::TopFieldFirst));
    assert_eq!(tags.tags[2].classification(), Classification::InterlacedBff);
    assert_eq!(tags.tags[2].group_id, 2);
    assert_eq!(tags.tags[2].cell_id, 20);
    for (frame, tag) in tags.tags.iter().enumerate() {
        assert_eq!(tag.frame, frame);
    }
}

#[test]
fn tags_keep_original_indices_after_expand() {
    let store = FlagStore::from_records([
        record(true, true, 0),
        record(true, false, 0),
        record(false, true, 0),
    ])
    .expect("store");
    let ceiled = NormalizedSequence::new(&store, FrameRate::NTSC).expand();
    let tags = ceiled.tag();

    assert_eq!(
        tags.tags.iter().map(|tag| tag.index).collect::<Vec<_>>(),
        vec![0, 0, 1, 2]
    );
    assert_eq!(
        tags.tags.iter().map(|tag| tag.frame).collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
}

#[test]
fn vob_map_partitions_frames() {
    let records: Vec<FlagRecord> = (0..100)
        .map(|_| record(true, false, 1))
        .chain((0..151).map(|_| record(false, true, 2)))
        .collect();
    let store = FlagStore::from_records(records).expect("store");
    let map = VobIndexMap::from_flags(store.flags());

    assert_eq!(map.to_string(), "0-99 100-250");
    assert_eq!(map.frame_count(), 251);
    assert_eq!(map.ranges()[0].group_id, 1);
    assert_eq!(map.ranges()[1].len(), 151);
    assert_eq!(map.range_of(99).map(|range| range.group_id), Some(1));
    assert_eq!(map.range_of(100).map(|range| range.group_id), Some(2));
    assert!(map.range_of(251).is_none());
}

#[test]
fn reappearing_group_gets_a_second_range() {
    let store = FlagStore::from_records([
        record(false, true, 1),
        record(false, true, 2),
        record(false, true, 2),
        record(false, true, 1),
    ])
    .expect("store");
    let map = VobIndexMap::from_flags(store.flags());

    assert_eq!(map.to_string(), "0-0 1-2 3-3");
    let groups: Vec<u32> = map.ranges().iter().map(|range| range.group_id).collect();
    assert_eq!(groups, vec![1, 2, 1]);
}

#[test]
fn vob_map_follows_contraction() {
    let mut records: Vec<FlagRecord> = (0..10)
        .map(|n| FlagRecord {
            progressive: true,
            repeat_first_field: n == 1 || n == 5,
            top_field_first: n == 1 || n == 5,
            group_id: 1,
            ..FlagRecord::default()
        })
        .collect();
    records.extend((0..10).map(|_| record(false, true, 2)));
    let store = FlagStore::from_records(records).expect("store");

    let floored = NormalizedSequence::new(&store, FrameRate::NTSC)
        .contract(None, None, DecimationPhase::PerRun)
        .expect("contract");
    assert_eq!(floored.tag().vob_map.to_string(), "0-9 10-17");
}

#[test]
fn parse_vob_map() {
    let map: VobIndexMap = "0-4 5-5 6-20".parse().expect("parse");
    assert_eq!(map.ranges().len(), 3);
    assert_eq!(map.ranges()[2].group_id, 2);
    assert_eq!(map.frame_count(), 21);
    assert_eq!(map.to_string(), "0-4 5-5 6-20");

    let empty: VobIndexMap = "".parse().expect("parse empty");
    assert_eq!(empty.frame_count(), 0);
}

#[test]
fn parse_vob_map_rejects_gaps_and_garbage() {
    for text in ["1-5", "0-4 6-9", "0-4 5-3", "0:4", "0-x", "0-18446744073709551615"] {
        assert!(
            matches!(
                text.parse::<VobIndexMap>(),
                Err(PulldownError::MalformedIndex { .. })
            ),
            "{text:?} should not parse"
        );
    }
}
