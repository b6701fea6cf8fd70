//! VFR analysis and frame rate tests.

use pulldown::{
    FlagRecord, FlagStore, FrameRate, PulldownError, VariableFrameRateAnalysis, VideoStandard,
};

fn analyse(pattern: &str) -> VariableFrameRateAnalysis {
    // P = progressive, R = progressive pulldown repeat, I = interlaced.
    let records = pattern.chars().map(|c| FlagRecord {
        progressive: c != 'I',
        repeat_first_field: c == 'R',
        top_field_first: c != 'P',
        ..FlagRecord::default()
    });
    let store = FlagStore::from_records(records).expect("Failed to build store");
    VariableFrameRateAnalysis::from_flags(store.flags())
}

#[test]
fn mixed_stream_is_vfr() {
    let analysis = analyse("RPPPRPPPIIII");
    assert!(analysis.is_variable_frame_rate);
    assert_eq!(analysis.total_pictures, 12);
    assert_eq!(analysis.progressive_pictures, 8);
    assert_eq!(analysis.interlaced_pictures, 4);
    assert_eq!(analysis.pulldown_pictures, 2);
    assert!((analysis.progressive_percentage - 66.666).abs() < 0.01);
    assert!(!analysis.is_fully_progressive());
}

#[test]
fn pure_film_is_not_vfr() {
    let analysis = analyse("RPPPRPPP");
    assert!(!analysis.is_variable_frame_rate);
    assert!(analysis.is_fully_progressive());
    assert_eq!(analysis.progressive_percentage, 100.0);
}

#[test]
fn interlaced_without_pulldown_is_not_vfr() {
    let analysis = analyse("PPPPIIII");
    assert!(!analysis.is_variable_frame_rate);
    assert_eq!(analysis.pulldown_pictures, 0);
}

#[test]
fn empty_flags() {
    let analysis = VariableFrameRateAnalysis::from_flags(&[]);
    assert_eq!(analysis.total_pictures, 0);
    assert_eq!(analysis.progressive_percentage, 0.0);
}

#[test]
fn standards_from_rates() {
    assert_eq!(VideoStandard::from_frame_rate(FrameRate::NTSC), VideoStandard::Ntsc);
    assert_eq!(VideoStandard::from_frame_rate(FrameRate::NTSC_FILM), VideoStandard::Ntsc);
    assert_eq!(VideoStandard::from_frame_rate(FrameRate::PAL), VideoStandard::Pal);
    let film = FrameRate::new(24, 1).expect("rate");
    assert_eq!(VideoStandard::from_frame_rate(film), VideoStandard::Film);
    let odd = FrameRate::new(15, 1).expect("rate");
    assert_eq!(VideoStandard::from_frame_rate(odd).to_string(), "?");
}

#[test]
fn frame_rates_reduce_and_parse() {
    let rate = FrameRate::new(60000, 2002).expect("rate");
    assert_eq!(rate, FrameRate::NTSC);
    assert_eq!(rate.to_string(), "30000/1001");
    assert_eq!("30000/1001".parse::<FrameRate>().expect("parse"), FrameRate::NTSC);
    assert_eq!("25".parse::<FrameRate>().expect("parse"), FrameRate::PAL);
    assert!("0/1".parse::<FrameRate>().is_err());
    assert!("abc".parse::<FrameRate>().is_err());
    assert!((FrameRate::NTSC.as_f64() - 29.97).abs() < 0.001);
}

#[test]
fn decimated_rates() {
    assert_eq!(FrameRate::NTSC.decimated(5).expect("rate"), FrameRate::NTSC_FILM);
    assert_eq!(
        FrameRate::PAL.decimated(2).expect("rate"),
        FrameRate::new(25, 2).expect("rate")
    );
    assert!(FrameRate::NTSC.decimated(1).is_err());
}

#[test]
fn scaling_overflow_is_an_error() {
    let huge = FrameRate::new(u64::MAX, 1).expect("rate");
    assert!(matches!(
        huge.decimated(5),
        Err(PulldownError::InvalidFrameRate(_))
    ));
    assert!(matches!(
        FrameRate::NTSC.scaled(1, u64::MAX),
        Err(PulldownError::InvalidFrameRate(_))
    ));
}
