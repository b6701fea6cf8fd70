//! Deinterlace plan tests.

use pulldown::{
    DeinterlacePlan, FieldOrder, FieldRate, FlagRecord, FlagStore, FrameAction, PulldownError, tag,
};

fn tags_for(pattern: &str) -> Vec<pulldown::FrameTag> {
    // P = progressive, T = interlaced TFF, B = interlaced BFF.
    let records = pattern.chars().map(|c| FlagRecord {
        progressive: c == 'P',
        top_field_first: c == 'T',
        ..FlagRecord::default()
    });
    let store = FlagStore::from_records(records).expect("Failed to build store");
    tag(store.flags()).tags
}

#[test]
fn field_rate_factors() {
    assert_eq!(FieldRate::from_factor(1.0).expect("single"), FieldRate::Single);
    assert_eq!(FieldRate::from_factor(2.0).expect("double"), FieldRate::Double);
    assert!(matches!(
        FieldRate::from_factor(1.5),
        Err(PulldownError::UnsupportedFieldRate(_))
    ));
}

#[test]
fn single_rate_plan() {
    let plan = DeinterlacePlan::build(&tags_for("PTB"), FieldRate::Single);
    assert_eq!(
        plan.actions,
        vec![
            FrameAction::PassThrough { source: 0 },
            FrameAction::Deinterlace {
                source: 1,
                order: FieldOrder::TopFieldFirst
            },
            FrameAction::Deinterlace {
                source: 2,
                order: FieldOrder::BottomFieldFirst
            },
        ]
    );
    assert_eq!(plan.deinterlaced_sources(), 2);
}

#[test]
fn double_rate_repeats_progressive_frames() {
    let plan = DeinterlacePlan::build(&tags_for("PT"), FieldRate::Double);
    let sources: Vec<usize> = plan.actions.iter().map(FrameAction::source).collect();
    assert_eq!(sources, vec![0, 0, 1, 1]);
    assert_eq!(plan.actions[1], FrameAction::PassThrough { source: 0 });
    assert_eq!(plan.deinterlaced_sources(), 1);
}

#[test]
fn progressive_frames_are_never_deinterlaced() {
    let plan = DeinterlacePlan::build(&tags_for("PPPP"), FieldRate::Double);
    assert_eq!(plan.deinterlaced_sources(), 0);
    assert!(
        plan.actions
            .iter()
            .all(|action| matches!(action, FrameAction::PassThrough { .. }))
    );
}
