//! Configuration tests.

use pulldown::{DecimationPhase, FrameRate, NormalizeOptions, RateMode};

#[test]
fn defaults() {
    let options = NormalizeOptions::default();
    assert_eq!(options.mode(), RateMode::Variable);
    assert_eq!(options.cycle(), None);
    assert_eq!(options.offsets(), None);
    assert_eq!(options.decimation_phase(), DecimationPhase::PerRun);
    assert_eq!(options.frame_rate(), None);
    assert!(options.settle_progressive());
}

#[test]
fn builder_chain() {
    let options = NormalizeOptions::new()
        .with_mode(RateMode::Contract)
        .with_cycle(5)
        .with_offsets(vec![0, 1, 3, 4])
        .with_decimation_phase(DecimationPhase::PerGroup)
        .with_frame_rate(FrameRate::PAL)
        .with_settle_progressive(false);

    assert_eq!(options.mode(), RateMode::Contract);
    assert_eq!(options.cycle(), Some(5));
    assert_eq!(options.offsets(), Some(&[0, 1, 3, 4][..]));
    assert_eq!(options.decimation_phase(), DecimationPhase::PerGroup);
    assert_eq!(options.frame_rate(), Some(FrameRate::PAL));
    assert!(!options.settle_progressive());

    let debug = format!("{options:?}");
    assert!(debug.contains("25/1"));
}

#[test]
fn rate_mode_names() {
    assert_eq!("ceil".parse::<RateMode>(), Ok(RateMode::Expand));
    assert_eq!("Expand".parse::<RateMode>(), Ok(RateMode::Expand));
    assert_eq!("floor".parse::<RateMode>(), Ok(RateMode::Contract));
    assert_eq!("vfr".parse::<RateMode>(), Ok(RateMode::Variable));
    assert!("sideways".parse::<RateMode>().is_err());
}
