//! Error handling tests.

use std::io::Cursor;

use pulldown::{FlagStore, PulldownError};

#[test]
fn error_messages() {
    let error = PulldownError::MalformedIndex {
        line: 12,
        reason: "invalid flag byte \"zz\"".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Malformed index at line 12: invalid flag byte \"zz\""
    );
    assert_eq!(
        PulldownError::NoCadence.to_string(),
        "No pulldown cadence detected and no cycle was given"
    );
    assert_eq!(
        PulldownError::EmptySequence.to_string(),
        "Index contains no pictures"
    );
    let error = PulldownError::InvalidOffsets {
        offsets: vec![0, 5],
        cycle: 5,
        reason: "offset 5 is outside the cycle".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Invalid offsets [0, 5] for cycle 5: offset 5 is outside the cycle"
    );
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: PulldownError = io.into();
    assert!(matches!(error, PulldownError::IoError(_)));
}

#[test]
fn invalid_json_is_reported() {
    assert!(matches!(
        FlagStore::from_json("{not json"),
        Err(PulldownError::JsonError(_))
    ));
    assert!(matches!(
        FlagStore::from_json("[]"),
        Err(PulldownError::EmptySequence)
    ));
}

#[test]
fn errors_are_std_errors() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<PulldownError>();

    let boxed: Box<dyn std::error::Error> = Box::new(PulldownError::NoCadence);
    assert!(boxed.to_string().contains("cadence"));
}

#[test]
fn bad_frame_rate_setting() {
    let text = "DGIndexProjectFile16\n0\n\nFrame_Rate=fast\n\n7 1 0 0 0 0 0 40\n";
    assert!(matches!(
        FlagStore::load(Cursor::new(text)),
        Err(PulldownError::InvalidFrameRate(_))
    ));
}
