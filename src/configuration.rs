//! Normalization configuration.
//!
//! [`NormalizeOptions`] is a builder that carries the rate policy and its
//! parameters through [`IndexedSource::normalize`](crate::IndexedSource::normalize)
//! without growing every function signature.
//!
//! # Example
//!
//! ```
//! use pulldown::{DecimationPhase, NormalizeOptions, RateMode};
//!
//! let options = NormalizeOptions::new()
//!     .with_mode(RateMode::Contract)
//!     .with_cycle(5)
//!     .with_offsets(vec![0, 1, 3, 4])
//!     .with_decimation_phase(DecimationPhase::PerGroup);
//! assert_eq!(options.mode(), RateMode::Contract);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::rational::FrameRate;

/// Which way to turn a variable-rate sequence into a constant-rate one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateMode {
    /// Leave the sequence variable-rate.
    #[default]
    Variable,
    /// "Ceil": materialize pulldown repeats as duplicate frames.
    Expand,
    /// "Floor": decimate interlaced runs down to the progressive rate.
    Contract,
}

impl FromStr for RateMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "variable" | "vfr" | "none" => Ok(RateMode::Variable),
            "expand" | "ceil" => Ok(RateMode::Expand),
            "contract" | "floor" => Ok(RateMode::Contract),
            other => Err(format!("unknown rate mode {other:?} (variable|ceil|floor)")),
        }
    }
}

/// Where the decimation cycle restarts inside interlaced runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecimationPhase {
    /// Restart at the first picture of every interlaced run.
    #[default]
    PerRun,
    /// Also restart whenever the group (VOB) id changes inside a run.
    PerGroup,
}

/// Options for one normalization pass.
///
/// All fields have defaults: variable rate, detected cycle, "drop the last
/// frame of each cycle" offsets, per-run phase, the store's own frame rate,
/// and progressive settling enabled.
#[derive(Clone)]
pub struct NormalizeOptions {
    pub(crate) mode: RateMode,
    pub(crate) cycle: Option<usize>,
    pub(crate) offsets: Option<Vec<usize>>,
    pub(crate) phase: DecimationPhase,
    pub(crate) frame_rate: Option<FrameRate>,
    pub(crate) settle_progressive: bool,
}

impl Debug for NormalizeOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NormalizeOptions")
            .field("mode", &self.mode)
            .field("cycle", &self.cycle)
            .field("offsets", &self.offsets)
            .field("phase", &self.phase)
            .field("frame_rate", &self.frame_rate.map(|rate| rate.to_string()))
            .field("settle_progressive", &self.settle_progressive)
            .finish()
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalizeOptions {
    pub fn new() -> Self {
        Self {
            mode: RateMode::Variable,
            cycle: None,
            offsets: None,
            phase: DecimationPhase::PerRun,
            frame_rate: None,
            settle_progressive: true,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use this cycle instead of the detected one when contracting.
    #[must_use]
    pub fn with_cycle(mut self, cycle: usize) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Positions of each cycle to keep when contracting.
    #[must_use]
    pub fn with_offsets(mut self, offsets: Vec<usize>) -> Self {
        self.offsets = Some(offsets);
        self
    }

    #[must_use]
    pub fn with_decimation_phase(mut self, phase: DecimationPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Override the nominal source frame rate read from the index.
    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    /// Contract fully progressive, non-VFR sources as soon as they are
    /// opened. Enabled by default.
    #[must_use]
    pub fn with_settle_progressive(mut self, settle: bool) -> Self {
        self.settle_progressive = settle;
        self
    }

    pub fn mode(&self) -> RateMode {
        self.mode
    }

    pub fn cycle(&self) -> Option<usize> {
        self.cycle
    }

    pub fn offsets(&self) -> Option<&[usize]> {
        self.offsets.as_deref()
    }

    pub fn decimation_phase(&self) -> DecimationPhase {
        self.phase
    }

    pub fn frame_rate(&self) -> Option<FrameRate> {
        self.frame_rate
    }

    pub fn settle_progressive(&self) -> bool {
        self.settle_progressive
    }
}
