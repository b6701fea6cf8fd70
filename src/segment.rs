//! Progressive/interlaced run segmentation.
//!
//! [`segment`] partitions a flag sequence into maximal runs of pictures that
//! share the same progressive classification. Consecutive runs always
//! alternate kind, and together they cover every position exactly once.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::flags::PictureFlag;

/// Whether a run holds progressive or interlaced pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RunKind {
    Progressive,
    Interlaced,
}

impl RunKind {
    fn of(flag: &PictureFlag) -> Self {
        if flag.progressive {
            RunKind::Progressive
        } else {
            RunKind::Interlaced
        }
    }
}

/// A maximal contiguous span `[start, end]` (inclusive) of same-kind pictures.
///
/// Positions refer to the slice that was segmented. For a freshly loaded
/// [`FlagStore`](crate::FlagStore) they equal the pictures' original indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Run {
    pub kind: RunKind,
    pub start: usize,
    pub end: usize,
}

impl Run {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always `false`; runs hold at least one picture.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn positions(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn is_progressive(&self) -> bool {
        self.kind == RunKind::Progressive
    }
}

/// Split `flags` into alternating progressive and interlaced runs.
///
/// Returns an empty vector for an empty slice.
pub fn segment(flags: &[PictureFlag]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for (position, flag) in flags.iter().enumerate() {
        let kind = RunKind::of(flag);
        match runs.last_mut() {
            Some(run) if run.kind == kind => run.end = position,
            _ => runs.push(Run {
                kind,
                start: position,
                end: position,
            }),
        }
    }
    runs
}

/// Cluster arbitrary indices into contiguous ranges.
///
/// Input order and duplicates do not matter: `{7, 1, 2, 3, 9, 8}` becomes
/// `[1..=3, 7..=9]`.
pub fn group_by_contiguous_index<I>(indices: I) -> Vec<RangeInclusive<usize>>
where
    I: IntoIterator<Item = usize>,
{
    let sorted: BTreeSet<usize> = indices.into_iter().collect();
    let mut groups: Vec<RangeInclusive<usize>> = Vec::new();
    for index in sorted {
        match groups.last_mut() {
            Some(range) if *range.end() + 1 == index => *range = *range.start()..=index,
            _ => groups.push(index..=index),
        }
    }
    groups
}
