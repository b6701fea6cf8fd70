//! Cycle/offset decimation.
//!
//! [`select`] keeps the items whose position modulo `cycle` is one of the
//! `offsets` (or, with `inverse`, exactly the items that would be dropped).
//! It works on any `Clone` item, so the same operator drops pictures from a
//! flag sequence and computes which plain frame numbers an inverse telecine
//! removes.
//!
//! # Example
//!
//! ```
//! use pulldown::decimate::select;
//!
//! let frames: Vec<usize> = (0..10).collect();
//! assert_eq!(select(&frames, 5, &[0, 1, 3, 4], false)?, [0, 1, 3, 4, 5, 6, 8, 9]);
//! assert_eq!(select(&frames, 5, &[0, 1, 3, 4], true)?, [2, 7]);
//! # Ok::<(), pulldown::PulldownError>(())
//! ```

use std::collections::BTreeSet;

use crate::error::PulldownError;
use crate::provenance::VobIndexMap;

/// A validated cycle and set of offsets to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimation {
    cycle: usize,
    offsets: BTreeSet<usize>,
}

impl Decimation {
    /// Validate a cycle and its offsets.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::InvalidCycle`] when `cycle` is zero and
    /// [`PulldownError::InvalidOffsets`] when `offsets` is empty or names a
    /// position outside the cycle.
    pub fn new(cycle: usize, offsets: &[usize]) -> Result<Self, PulldownError> {
        if cycle == 0 {
            return Err(PulldownError::InvalidCycle(cycle));
        }
        if offsets.is_empty() {
            return Err(PulldownError::invalid_offsets(offsets, cycle, "offsets cannot be empty"));
        }
        if let Some(&offset) = offsets.iter().find(|&&offset| offset >= cycle) {
            return Err(PulldownError::invalid_offsets(
                offsets,
                cycle,
                format!("offset {offset} is outside the cycle"),
            ));
        }
        Ok(Self {
            cycle,
            offsets: offsets.iter().copied().collect(),
        })
    }

    /// Keep every position of the cycle except the last one.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::InvalidCycle`] for a cycle below 2, which
    /// would leave nothing to keep.
    pub fn drop_last(cycle: usize) -> Result<Self, PulldownError> {
        if cycle < 2 {
            return Err(PulldownError::InvalidCycle(cycle));
        }
        let offsets: Vec<usize> = (0..cycle - 1).collect();
        Self::new(cycle, &offsets)
    }

    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.offsets.iter().copied()
    }

    /// Number of positions kept from each full cycle.
    pub fn kept_per_cycle(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the item at `position` survives.
    pub fn keeps(&self, position: usize) -> bool {
        self.offsets.contains(&(position % self.cycle))
    }

    /// Items that survive decimation.
    pub fn apply<T: Clone>(&self, data: &[T]) -> Vec<T> {
        self.filter(data, false)
    }

    /// Items that decimation removes.
    pub fn dropped<T: Clone>(&self, data: &[T]) -> Vec<T> {
        self.filter(data, true)
    }

    fn filter<T: Clone>(&self, data: &[T], inverse: bool) -> Vec<T> {
        data.iter()
            .enumerate()
            .filter(|(position, _)| self.keeps(*position) != inverse)
            .map(|(_, item)| item.clone())
            .collect()
    }
}

/// Keep items by cycle and offsets.
///
/// Position `i` is kept when `i % cycle` is in `offsets`, XOR `inverse`.
/// Positions count from the start of `data`. Empty input yields empty output.
///
/// # Errors
///
/// See [`Decimation::new`].
pub fn select<T: Clone>(
    data: &[T],
    cycle: usize,
    offsets: &[usize],
    inverse: bool,
) -> Result<Vec<T>, PulldownError> {
    let decimation = Decimation::new(cycle, offsets)?;
    Ok(decimation.filter(data, inverse))
}

/// Decimate each source group independently.
///
/// `data` is split along `vob_map`; group `i` uses `patterns[i]`, or
/// `patterns[0]` when fewer patterns than groups are given. The cycle
/// restarts at the first frame of every group.
///
/// # Errors
///
/// Returns [`PulldownError::InvalidOffsets`] if `patterns` is empty and
/// [`PulldownError::MalformedIndex`] if the map does not cover `data`
/// exactly.
pub fn decimate_per_group<T: Clone>(
    data: &[T],
    vob_map: &VobIndexMap,
    patterns: &[Decimation],
) -> Result<Vec<T>, PulldownError> {
    let Some(fallback) = patterns.first() else {
        return Err(PulldownError::invalid_offsets(&[], 0, "no decimation pattern given"));
    };
    if vob_map.frame_count() != data.len() {
        return Err(PulldownError::malformed(
            0,
            format!(
                "group map covers {} frames but {} were given",
                vob_map.frame_count(),
                data.len()
            ),
        ));
    }

    let mut output = Vec::with_capacity(data.len());
    for (group, range) in vob_map.ranges().iter().enumerate() {
        let pattern = patterns.get(group).unwrap_or(fallback);
        log::debug!(
            "Decimating group {} frames {}-{} with cycle {}",
            range.group_id,
            range.first,
            range.last,
            pattern.cycle()
        );
        output.extend(pattern.apply(&data[range.first..=range.last]));
    }
    Ok(output)
}
