//! Per-frame provenance tags and the group index map.
//!
//! After normalization every output frame corresponds to exactly one entry of
//! the final flag sequence. [`tag`] binds the two together so a deinterlacer
//! can look up whether a frame is progressive and which field order it uses,
//! and builds the [`VobIndexMap`] used to restart decimation cycles at group
//! boundaries.
//!
//! A `VobIndexMap` persists as space-separated inclusive ranges, the same
//! shape DGIndex-based scripts attach as frame properties:
//!
//! ```
//! use pulldown::VobIndexMap;
//!
//! let map: VobIndexMap = "0-99 100-250".parse()?;
//! assert_eq!(map.frame_count(), 251);
//! assert_eq!(map.to_string(), "0-99 100-250");
//! # Ok::<(), pulldown::PulldownError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::Serialize;

use crate::error::PulldownError;
use crate::flags::{Classification, FieldOrder, PictureFlag};

/// Provenance of one output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FrameTag {
    /// Output frame number.
    pub frame: usize,
    /// Original picture index the frame was produced from.
    pub index: usize,
    pub progressive: bool,
    pub group_id: u32,
    pub cell_id: u32,
    /// Field order for interlaced frames, `None` for progressive ones.
    pub field_order: Option<FieldOrder>,
}

impl FrameTag {
    pub fn classification(&self) -> Classification {
        match self.field_order {
            None => Classification::Progressive,
            Some(FieldOrder::TopFieldFirst) => Classification::InterlacedTff,
            Some(FieldOrder::BottomFieldFirst) => Classification::InterlacedBff,
        }
    }
}

/// The output frames `first..=last` that belong to one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GroupRange {
    pub group_id: u32,
    pub first: usize,
    pub last: usize,
}

impl GroupRange {
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// Always `false`; a range holds at least one frame.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Ordered, gap-free, non-overlapping group ranges over the output frames.
///
/// A new range starts whenever the group id changes, so a group that
/// reappears later in the stream gets a second entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VobIndexMap {
    ranges: Vec<GroupRange>,
}

impl VobIndexMap {
    /// Build the map for a final flag sequence.
    pub fn from_flags(flags: &[PictureFlag]) -> Self {
        let mut ranges: Vec<GroupRange> = Vec::new();
        for (frame, flag) in flags.iter().enumerate() {
            match ranges.last_mut() {
                Some(range) if range.group_id == flag.group_id => range.last = frame,
                _ => ranges.push(GroupRange {
                    group_id: flag.group_id,
                    first: frame,
                    last: frame,
                }),
            }
        }
        Self { ranges }
    }

    pub fn ranges(&self) -> &[GroupRange] {
        &self.ranges
    }

    /// Total number of frames covered.
    pub fn frame_count(&self) -> usize {
        self.ranges
            .last()
            .map_or(0, |range| range.last.saturating_add(1))
    }

    /// The range containing `frame`, if any.
    pub fn range_of(&self, frame: usize) -> Option<&GroupRange> {
        let position = self.ranges.partition_point(|range| range.last < frame);
        self.ranges.get(position).filter(|range| range.first <= frame)
    }
}

impl Display for VobIndexMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (position, range) in self.ranges.iter().enumerate() {
            if position > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}-{}", range.first, range.last)?;
        }
        Ok(())
    }
}

impl FromStr for VobIndexMap {
    type Err = PulldownError;

    /// Parse `"first-last first-last ..."`.
    ///
    /// Group ids are not stored in the text form, so ranges are numbered
    /// `0, 1, 2, ...` in order.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();
        let mut expected_first = 0;
        for (group, token) in value.split_whitespace().enumerate() {
            let invalid = |reason: String| PulldownError::malformed(0, reason);
            let (first, last) = token
                .split_once('-')
                .ok_or_else(|| invalid(format!("expected first-last, found {token:?}")))?;
            let first: usize = first
                .parse()
                .map_err(|_| invalid(format!("invalid range start in {token:?}")))?;
            let last: usize = last
                .parse()
                .map_err(|_| invalid(format!("invalid range end in {token:?}")))?;
            if first != expected_first {
                return Err(invalid(format!(
                    "range {token:?} should start at frame {expected_first}"
                )));
            }
            if last < first {
                return Err(invalid(format!("range {token:?} ends before it starts")));
            }
            let group_id = u32::try_from(group)
                .map_err(|_| invalid("too many group ranges".to_string()))?;
            ranges.push(GroupRange {
                group_id,
                first,
                last,
            });
            expected_first = last
                .checked_add(1)
                .ok_or_else(|| invalid(format!("range {token:?} ends past the last frame")))?;
        }
        Ok(Self { ranges })
    }
}

/// Tags for every output frame together with the group map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameTags {
    pub tags: Vec<FrameTag>,
    pub vob_map: VobIndexMap,
}

impl FrameTags {
    pub fn get(&self, frame: usize) -> Option<&FrameTag> {
        self.tags.get(frame)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Bind a final flag sequence to output frame numbers, one tag per entry.
pub fn tag(flags: &[PictureFlag]) -> FrameTags {
    let tags = flags
        .iter()
        .enumerate()
        .map(|(frame, flag)| FrameTag {
            frame,
            index: flag.index,
            progressive: flag.progressive,
            group_id: flag.group_id,
            cell_id: flag.cell_id,
            field_order: flag.classification().field_order(),
        })
        .collect();
    FrameTags {
        tags,
        vob_map: VobIndexMap::from_flags(flags),
    }
}
