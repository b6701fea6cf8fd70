//! Validation report tests.

use pulldown::{FlagRecord, FlagStore, FrameRate, ValidationReport, validate_flags};

fn flags_from(records: Vec<FlagRecord>) -> FlagStore {
    FlagStore::from_records(records).expect("Failed to build store")
}

fn telecined(count: usize, group_id: u32) -> Vec<FlagRecord> {
    (0..count)
        .map(|n| FlagRecord {
            progressive: true,
            repeat_first_field: n % 4 == 0,
            top_field_first: n % 4 == 0,
            group_id,
            ..FlagRecord::default()
        })
        .collect()
}

fn interlaced(count: usize, top_field_first: bool, group_id: u32) -> Vec<FlagRecord> {
    (0..count)
        .map(|_| FlagRecord {
            top_field_first,
            group_id,
            ..FlagRecord::default()
        })
        .collect()
}

#[test]
fn clean_telecine_has_no_warnings() {
    let mut records = telecined(20, 0);
    records.extend(interlaced(6, true, 0));
    let store = flags_from(records);
    let report = validate_flags(store.flags(), Some(FrameRate::NTSC));

    assert!(report.is_valid());
    assert!(report.warnings.is_empty(), "unexpected: {:?}", report.warnings);
    assert!(report.info.iter().any(|line| line == "VFR: yes"));
    assert!(report.info.iter().any(|line| line.contains("Pulldown 2:3 (cycle 5)")));
    assert!(report.info.iter().any(|line| line.contains("NTSC")));
    assert!(report.info.iter().any(|line| line == "1 source groups"));
}

#[test]
fn empty_flags_are_an_error() {
    let report = validate_flags(&[], Some(FrameRate::NTSC));
    assert!(!report.is_valid());
    assert_eq!(report.errors.len(), 1);
}

#[test]
fn missing_frame_rate_is_an_error() {
    let store = flags_from(telecined(8, 0));
    let report = validate_flags(store.flags(), None);
    assert!(!report.is_valid());
    assert!(report.errors[0].contains("frame rate"));
}

#[test]
fn pal_with_pulldown_warns() {
    let store = flags_from(telecined(8, 0));
    let report = validate_flags(store.flags(), Some(FrameRate::PAL));
    assert!(report.warnings.iter().any(|line| line.contains("PAL")));
}

#[test]
fn disagreeing_segments_warn() {
    let mut records = telecined(20, 0);
    records.extend(interlaced(2, true, 0));
    // Marks every third picture: gap 3.
    records.extend((0..12).map(|n| FlagRecord {
        progressive: true,
        repeat_first_field: n % 3 == 0,
        top_field_first: n % 3 == 0,
        ..FlagRecord::default()
    }));
    records.extend(interlaced(2, true, 0));
    records.extend(telecined(20, 0));
    let store = flags_from(records);
    let report = validate_flags(store.flags(), Some(FrameRate::NTSC));

    assert!(
        report
            .warnings
            .iter()
            .any(|line| line.starts_with("1 of 3 progressive segments")),
        "warnings: {:?}",
        report.warnings
    );
}

#[test]
fn interlaced_repeats_warn() {
    let mut records = interlaced(4, true, 0);
    records[1].repeat_first_field = true;
    let store = flags_from(records);
    let report = validate_flags(store.flags(), Some(FrameRate::NTSC));
    assert!(
        report
            .warnings
            .iter()
            .any(|line| line.starts_with("1 interlaced pictures carry repeat_first_field"))
    );
}

#[test]
fn mixed_field_order_is_noted() {
    let mut records = interlaced(3, true, 0);
    records.extend(interlaced(3, false, 0));
    let store = flags_from(records);
    let report = validate_flags(store.flags(), Some(FrameRate::NTSC));
    assert!(report.info.iter().any(|line| line == "1 interlaced runs switch field order"));
    assert!(report.info.iter().any(|line| line == "No pulldown"));
}

#[test]
fn reappearing_groups_warn() {
    let mut records = telecined(8, 1);
    records.extend(interlaced(4, true, 2));
    records.extend(telecined(8, 1));
    let store = flags_from(records);
    let report = validate_flags(store.flags(), Some(FrameRate::NTSC));

    assert!(report.info.iter().any(|line| line == "2 source groups"));
    assert!(report.warnings.iter().any(|line| line.starts_with("Groups [1]")));
}

#[test]
fn report_display() {
    let report = ValidationReport {
        info: vec!["fine".to_string()],
        warnings: vec!["careful".to_string()],
        errors: vec!["broken".to_string()],
    };
    assert_eq!(report.issue_count(), 3);
    assert_eq!(report.to_string(), "[INFO] fine\n[WARN] careful\n[ERROR] broken\n");
    assert_eq!(ValidationReport::default().to_string(), "No issues found.\n");
}
