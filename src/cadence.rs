//! Telecine pulldown cadence detection.
//!
//! The default [`ModalGapDetector`] looks at progressive-only segments of the
//! flag sequence, measures the gap between paired repeat marks
//! (`rff && tff`) in each segment, and takes the most common per-segment gap.
//! It is a heuristic: segments that straddle edits or burned-in interlaced
//! inserts can disagree near their boundaries, and the modal vote is what
//! keeps such noise from changing the result. Callers that already know the
//! cadence (for example from a container-level hint) can use
//! [`FixedCadence`] instead.
//!
//! # Example
//!
//! ```
//! use pulldown::{Cadence, FlagRecord, FlagStore, cadence};
//!
//! // Soft 2:3 telecine: a repeat mark on every fourth progressive picture.
//! let records = (0..40).map(|n| FlagRecord {
//!     progressive: true,
//!     repeat_first_field: n % 2 == 0,
//!     top_field_first: n % 4 < 2,
//!     ..FlagRecord::default()
//! });
//! let store = FlagStore::from_records(records)?;
//! assert_eq!(cadence::detect(store.flags()), Cadence::from_cycle(5));
//! # Ok::<(), pulldown::PulldownError>(())
//! ```

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::Hash;

use serde::Serialize;

use crate::flags::PictureFlag;

/// A detected (or supplied) pulldown cadence.
///
/// `cycle` is the number of frames after which the repeat pattern recurs;
/// zero means no pulldown. `pattern` is the colon-joined field-repeat string,
/// e.g. `"2:3"` for a cycle of 5.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Cadence {
    pub cycle: usize,
    pub pattern: Option<String>,
}

impl Cadence {
    /// No pulldown detected.
    pub fn none() -> Self {
        Self {
            cycle: 0,
            pattern: None,
        }
    }

    /// Build the cadence for a cycle length.
    ///
    /// The pattern is `cycle / 2` copies of `"2"`, with the last one turned
    /// into a `"3"` when the cycle is odd. A cycle of zero yields
    /// [`Cadence::none`].
    pub fn from_cycle(cycle: usize) -> Self {
        if cycle == 0 {
            return Self::none();
        }
        let mut pattern = vec!["2"; cycle / 2];
        if cycle % 2 == 1 {
            pattern.pop();
            pattern.push("3");
        }
        Self {
            cycle,
            pattern: Some(pattern.join(":")),
        }
    }

    pub fn is_detected(&self) -> bool {
        self.cycle > 0
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::none()
    }
}

impl Display for Cadence {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.pattern {
            Some(pattern) => write!(f, "{pattern} (cycle {})", self.cycle),
            None => write!(f, "no pulldown"),
        }
    }
}

/// Strategy for finding the pulldown cadence of a flag sequence.
pub trait CadenceDetector: Send + Sync {
    fn detect(&self, flags: &[PictureFlag]) -> Cadence;
}

/// Most-common-gap heuristic over progressive segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModalGapDetector;

impl CadenceDetector for ModalGapDetector {
    fn detect(&self, flags: &[PictureFlag]) -> Cadence {
        let segment_gaps = segment_modal_gaps(flags);
        let Some(gap) = most_common(segment_gaps) else {
            log::debug!("No progressive segment carries two or more repeat marks");
            return Cadence::none();
        };
        let cadence = Cadence::from_cycle(gap + 1);
        log::debug!("Detected pulldown cadence {cadence}");
        cadence
    }
}

/// A cadence known ahead of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCadence(pub usize);

impl CadenceDetector for FixedCadence {
    fn detect(&self, _flags: &[PictureFlag]) -> Cadence {
        Cadence::from_cycle(self.0)
    }
}

/// Detect the cadence with [`ModalGapDetector`].
pub fn detect(flags: &[PictureFlag]) -> Cadence {
    ModalGapDetector.detect(flags)
}

/// The modal repeat-mark gap of every progressive segment that has at least
/// two marks, in segment order.
///
/// Segments are maximal progressive runs (interlaced pictures split them).
/// Marks are paired without overlap (first with second, third with fourth)
/// and positions are those of the given slice.
pub fn segment_modal_gaps(flags: &[PictureFlag]) -> Vec<usize> {
    let mut gaps = Vec::new();
    let mut marks: Vec<usize> = Vec::new();

    let mut close_segment = |marks: &mut Vec<usize>| {
        if marks.len() > 1 {
            let pair_gaps = marks.chunks_exact(2).map(|pair| pair[1] - pair[0]);
            if let Some(gap) = most_common(pair_gaps) {
                gaps.push(gap);
            }
        }
        marks.clear();
    };

    for (position, flag) in flags.iter().enumerate() {
        if !flag.progressive {
            close_segment(&mut marks);
            continue;
        }
        if flag.is_repeat_mark() {
            marks.push(position);
        }
    }
    close_segment(&mut marks);

    gaps
}

/// Most frequent value; ties go to the value seen first.
pub(crate) fn most_common<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Copy,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (order, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, order)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}
