//! Deinterlacing plans from frame tags.
//!
//! The pixel work is done by an external filter that is given a field order
//! and returns either one frame per input frame (single rate) or one per
//! field (double rate). [`DeinterlacePlan`] decides, per output frame of that
//! filter, whether the source frame passes through untouched or which field
//! order the filter must use, so progressive frames are never deinterlaced.

use serde::Serialize;

use crate::error::PulldownError;
use crate::flags::FieldOrder;
use crate::provenance::FrameTag;

/// Output rate of the external deinterlacer relative to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldRate {
    /// One output frame per input frame.
    Single,
    /// One output frame per field.
    Double,
}

impl FieldRate {
    /// Map a measured output/input frame-rate ratio to a field rate.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::UnsupportedFieldRate`] for anything other
    /// than 1.0 or 2.0.
    pub fn from_factor(factor: f64) -> Result<Self, PulldownError> {
        const TOLERANCE: f64 = 1e-6;
        if (factor - 1.0).abs() < TOLERANCE {
            Ok(FieldRate::Single)
        } else if (factor - 2.0).abs() < TOLERANCE {
            Ok(FieldRate::Double)
        } else {
            Err(PulldownError::UnsupportedFieldRate(format!(
                "deinterlacer changed the frame rate by a factor of {factor}; only 1 and 2 are supported"
            )))
        }
    }

    pub fn frames_per_input(self) -> usize {
        match self {
            FieldRate::Single => 1,
            FieldRate::Double => 2,
        }
    }
}

/// What to emit for one deinterlacer output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FrameAction {
    /// Emit source frame `source` as is.
    PassThrough { source: usize },
    /// Take this output from the deinterlacer run with `order`.
    Deinterlace { source: usize, order: FieldOrder },
}

impl FrameAction {
    pub fn source(&self) -> usize {
        match self {
            FrameAction::PassThrough { source } | FrameAction::Deinterlace { source, .. } => {
                *source
            }
        }
    }
}

/// Per-frame deinterlacing decisions for a tagged sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeinterlacePlan {
    pub field_rate: FieldRate,
    pub actions: Vec<FrameAction>,
}

impl DeinterlacePlan {
    /// Build the plan. At double rate every source frame yields two
    /// actions; progressive frames are simply repeated.
    pub fn build(tags: &[FrameTag], field_rate: FieldRate) -> Self {
        let actions = tags
            .iter()
            .flat_map(|tag| {
                let action = match tag.field_order {
                    None => FrameAction::PassThrough { source: tag.frame },
                    Some(order) => FrameAction::Deinterlace {
                        source: tag.frame,
                        order,
                    },
                };
                std::iter::repeat_n(action, field_rate.frames_per_input())
            })
            .collect();
        Self {
            field_rate,
            actions,
        }
    }

    /// Number of source frames that need the deinterlacer.
    pub fn deinterlaced_sources(&self) -> usize {
        self.actions
            .iter()
            .filter(|action| matches!(action, FrameAction::Deinterlace { .. }))
            .count()
            / self.field_rate.frames_per_input()
    }
}
