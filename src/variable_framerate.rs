//! Variable frame rate (VFR) detection from picture flags.
//!
//! A stream is VFR when it mixes progressive pictures that carry pulldown
//! repeats (which play at the film rate once the repeats are honored) with
//! interlaced pictures (which play at the full video rate).
//!
//! # Example
//!
//! ```no_run
//! use pulldown::{FlagStore, PulldownError, VariableFrameRateAnalysis};
//!
//! let store = FlagStore::open("episode.d2v")?;
//! let analysis = VariableFrameRateAnalysis::from_flags(store.flags());
//! if analysis.is_variable_frame_rate {
//!     println!("VFR: {:.2}% progressive", analysis.progressive_percentage);
//! }
//! # Ok::<(), PulldownError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

use crate::flags::PictureFlag;
use crate::normalize::has_variable_frame_rate;
use crate::rational::FrameRate;

/// Composition of a flag sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableFrameRateAnalysis {
    /// Pulldown-flagged progressive pictures coexist with interlaced ones.
    pub is_variable_frame_rate: bool,
    pub total_pictures: usize,
    pub progressive_pictures: usize,
    pub interlaced_pictures: usize,
    /// Progressive pictures with `rff && tff` set.
    pub pulldown_pictures: usize,
    /// Share of progressive pictures, 0.0 to 100.0.
    pub progressive_percentage: f64,
}

impl VariableFrameRateAnalysis {
    pub fn from_flags(flags: &[PictureFlag]) -> Self {
        let total_pictures = flags.len();
        let progressive_pictures = flags.iter().filter(|flag| flag.progressive).count();
        let pulldown_pictures = flags.iter().filter(|flag| flag.is_pulldown()).count();
        let progressive_percentage = if total_pictures == 0 {
            0.0
        } else {
            progressive_pictures as f64 / total_pictures as f64 * 100.0
        };

        Self {
            is_variable_frame_rate: has_variable_frame_rate(flags),
            total_pictures,
            progressive_pictures,
            interlaced_pictures: total_pictures - progressive_pictures,
            pulldown_pictures,
            progressive_percentage,
        }
    }

    pub fn is_fully_progressive(&self) -> bool {
        self.interlaced_pictures == 0
    }
}

/// Broadcast standard implied by a nominal frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VideoStandard {
    /// 30000/1001, 24000/1001 and 60000/1001.
    Ntsc,
    /// 25 and 50.
    Pal,
    /// Integer 24.
    Film,
    Unknown,
}

impl VideoStandard {
    pub fn from_frame_rate(frame_rate: FrameRate) -> Self {
        match (frame_rate.numerator(), frame_rate.denominator()) {
            (30000 | 24000 | 60000, 1001) => VideoStandard::Ntsc,
            (25 | 50, 1) => VideoStandard::Pal,
            (24, 1) => VideoStandard::Film,
            _ => VideoStandard::Unknown,
        }
    }
}

impl Display for VideoStandard {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            VideoStandard::Ntsc => "NTSC",
            VideoStandard::Pal => "PAL",
            VideoStandard::Film => "FILM",
            VideoStandard::Unknown => "?",
        };
        write!(f, "{name}")
    }
}
