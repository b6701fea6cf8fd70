//! Variable to constant frame rate normalization.
//!
//! A [`NormalizedSequence`] is an immutable snapshot: a flag sequence, its
//! nominal frame rate, the cadence detected on it, the operations that
//! produced it, and a [`RateState`] token. It starts out as
//! [`RateState::VariableRate`] and can move exactly once, either to
//! [`RateState::Expanded`] ("ceil") or to [`RateState::Contracted`]
//! ("floor"). Every transform returns a new snapshot; calling a transform on
//! a terminal snapshot returns it unchanged.
//!
//! # Example
//!
//! ```
//! use pulldown::{FlagRecord, FlagStore, FrameRate, NormalizedSequence, RateState};
//!
//! let mut records: Vec<FlagRecord> = (0..8)
//!     .map(|n| FlagRecord {
//!         progressive: true,
//!         repeat_first_field: n % 2 == 0,
//!         top_field_first: n % 4 < 2,
//!         ..FlagRecord::default()
//!     })
//!     .collect();
//! records.extend((0..5).map(|_| FlagRecord { top_field_first: true, ..FlagRecord::default() }));
//! let store = FlagStore::from_records(records)?;
//!
//! let source = NormalizedSequence::new(&store, FrameRate::NTSC);
//! let floored = source.contract(None, None, Default::default())?;
//! assert_eq!(floored.state(), RateState::Contracted);
//! assert_eq!(floored.len(), 12);
//! assert_eq!(floored.frame_rate(), FrameRate::NTSC_FILM);
//! # Ok::<(), pulldown::PulldownError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::Serialize;

use crate::cadence::{Cadence, CadenceDetector, ModalGapDetector};
use crate::configuration::{DecimationPhase, NormalizeOptions, RateMode};
use crate::decimate::Decimation;
use crate::error::PulldownError;
use crate::flags::{FlagStore, PictureFlag};
use crate::provenance::{self, FrameTags};
use crate::rational::FrameRate;
use crate::segment::{self, Run};

/// Where a sequence is in its single variable-to-constant transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RateState {
    VariableRate,
    Expanded,
    Contracted,
}

impl RateState {
    pub fn is_terminal(self) -> bool {
        self != RateState::VariableRate
    }
}

/// One edit applied to the working sequence.
///
/// Positions refer to the sequence the operation was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NormalizationOp {
    /// Emit the picture twice.
    Duplicate(usize),
    /// Drop the picture.
    Delete(usize),
}

impl NormalizationOp {
    pub fn position(&self) -> usize {
        match self {
            NormalizationOp::Duplicate(position) | NormalizationOp::Delete(position) => *position,
        }
    }
}

/// An immutable flag sequence at a known rate and [`RateState`].
#[derive(Clone)]
pub struct NormalizedSequence {
    state: RateState,
    flags: Arc<[PictureFlag]>,
    frame_rate: FrameRate,
    cadence: Cadence,
    ops: Arc<[NormalizationOp]>,
    detector: Arc<dyn CadenceDetector>,
}

impl Debug for NormalizedSequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NormalizedSequence")
            .field("state", &self.state)
            .field("pictures", &self.flags.len())
            .field("frame_rate", &self.frame_rate.to_string())
            .field("cadence", &self.cadence)
            .field("ops", &self.ops.len())
            .finish_non_exhaustive()
    }
}

impl NormalizedSequence {
    /// Start a variable-rate sequence over a store, detecting the cadence
    /// with [`ModalGapDetector`].
    pub fn new(store: &FlagStore, frame_rate: FrameRate) -> Self {
        Self::with_detector(store, frame_rate, Arc::new(ModalGapDetector))
    }

    /// Start a variable-rate sequence with a custom cadence detector.
    ///
    /// The detector is kept and rerun on every derived sequence.
    pub fn with_detector(
        store: &FlagStore,
        frame_rate: FrameRate,
        detector: Arc<dyn CadenceDetector>,
    ) -> Self {
        let flags = store.shared();
        let cadence = detector.detect(&flags);
        Self {
            state: RateState::VariableRate,
            flags,
            frame_rate,
            cadence,
            ops: Arc::from(Vec::new()),
            detector,
        }
    }

    pub fn state(&self) -> RateState {
        self.state
    }

    pub fn flags(&self) -> &[PictureFlag] {
        &self.flags
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    /// Operations that produced this sequence from its variable-rate parent.
    pub fn ops(&self) -> &[NormalizationOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Runs of the current sequence.
    pub fn runs(&self) -> Vec<Run> {
        segment::segment(&self.flags)
    }

    /// Provenance tags for every frame of the current sequence.
    pub fn tag(&self) -> FrameTags {
        provenance::tag(&self.flags)
    }

    /// Apply the policy selected in `options`.
    ///
    /// # Errors
    ///
    /// See [`contract`](Self::contract).
    pub fn normalize(&self, options: &NormalizeOptions) -> Result<Self, PulldownError> {
        let base = match options.frame_rate() {
            Some(rate) if !self.state.is_terminal() => self.retagged(rate),
            _ => self.clone(),
        };
        match options.mode() {
            RateMode::Variable => Ok(base),
            RateMode::Expand => Ok(base.expand()),
            RateMode::Contract => base.contract(
                options.cycle(),
                options.offsets(),
                options.decimation_phase(),
            ),
        }
    }

    /// "Ceil": duplicate every progressive picture carrying a pulldown
    /// repeat (`progressive && rff && tff`) and clear `rff` on both copies.
    ///
    /// Nothing is dropped and the frame rate is unchanged; the result plays
    /// at the interlaced-section rate. Returns `self` unchanged when already
    /// terminal.
    pub fn expand(&self) -> Self {
        if self.state.is_terminal() {
            log::debug!("Expand skipped: sequence is already {:?}", self.state);
            return self.clone();
        }

        let ops: Vec<NormalizationOp> = self
            .flags
            .iter()
            .enumerate()
            .filter(|(_, flag)| flag.is_pulldown())
            .map(|(position, _)| NormalizationOp::Duplicate(position))
            .collect();
        log::debug!(
            "Expanding {} pictures: {} pulldown repeats become duplicates",
            self.flags.len(),
            ops.len()
        );

        self.derive(RateState::Expanded, self.frame_rate, ops)
    }

    /// "Floor": decimate every interlaced run by `cycle`/`offsets` and retag
    /// the whole sequence at `rate - rate / cycle`.
    ///
    /// `cycle` defaults to the detected cadence; `offsets` default to every
    /// position except the last of each cycle. Progressive runs keep all
    /// their pictures. Which positions an offset refers to restarts at each
    /// interlaced run, and with [`DecimationPhase::PerGroup`] also at every
    /// group change inside a run. Returns `self` unchanged when already
    /// terminal.
    ///
    /// # Errors
    ///
    /// - [`PulldownError::NoCadence`] if no cycle is given and none was
    ///   detected.
    /// - [`PulldownError::InvalidOffsets`] if `offsets` is empty, has as
    ///   many entries as the cycle, or names a position outside it. A cycle
    ///   of 1 without explicit offsets also fails this way, since its
    ///   default offsets are empty.
    pub fn contract(
        &self,
        cycle: Option<usize>,
        offsets: Option<&[usize]>,
        phase: DecimationPhase,
    ) -> Result<Self, PulldownError> {
        if self.state.is_terminal() {
            log::debug!("Contract skipped: sequence is already {:?}", self.state);
            return Ok(self.clone());
        }

        let cycle = cycle
            .filter(|&cycle| cycle > 0)
            .or_else(|| self.cadence.is_detected().then_some(self.cadence.cycle))
            .ok_or(PulldownError::NoCadence)?;
        let decimation = match offsets {
            Some(offsets) => {
                if offsets.len() >= cycle {
                    return Err(PulldownError::invalid_offsets(
                        offsets,
                        cycle,
                        "offsets must keep fewer positions than the cycle has",
                    ));
                }
                Decimation::new(cycle, offsets)?
            }
            None if cycle < 2 => {
                return Err(PulldownError::invalid_offsets(
                    &[],
                    cycle,
                    "a cycle of 1 leaves no default offsets to keep",
                ));
            }
            None => Decimation::drop_last(cycle)?,
        };
        let frame_rate = self.frame_rate.decimated(cycle)?;

        if decimation.kept_per_cycle() + 1 != cycle {
            log::warn!(
                "Keeping {} of every {} interlaced pictures; interlaced runs will not match the {} progressive rate",
                decimation.kept_per_cycle(),
                cycle,
                frame_rate
            );
        }

        let interlaced = self
            .flags
            .iter()
            .enumerate()
            .filter(|(_, flag)| !flag.progressive)
            .map(|(position, _)| position);
        let mut ops = Vec::new();
        for run in segment::group_by_contiguous_index(interlaced) {
            for span in phase_spans(&self.flags, run, phase) {
                let positions: Vec<usize> = span.collect();
                ops.extend(
                    decimation
                        .dropped(&positions)
                        .into_iter()
                        .map(NormalizationOp::Delete),
                );
            }
        }
        log::debug!(
            "Contracting {} pictures with cycle {}: {} interlaced pictures dropped, {} -> {}",
            self.flags.len(),
            cycle,
            ops.len(),
            self.frame_rate,
            frame_rate
        );

        Ok(self.derive(RateState::Contracted, frame_rate, ops))
    }

    /// `true` when the sequence mixes pulldown-flagged progressive pictures
    /// with interlaced ones.
    pub fn is_variable_frame_rate(&self) -> bool {
        has_variable_frame_rate(&self.flags)
    }

    /// The same sequence at a different nominal rate.
    pub(crate) fn retagged(&self, frame_rate: FrameRate) -> Self {
        Self {
            frame_rate,
            ..self.clone()
        }
    }

    /// The same sequence with the cadence marked as consumed.
    pub(crate) fn without_cadence(mut self) -> Self {
        self.cadence = Cadence::none();
        self
    }

    fn derive(&self, state: RateState, frame_rate: FrameRate, ops: Vec<NormalizationOp>) -> Self {
        let flags: Arc<[PictureFlag]> = apply_ops(&self.flags, &ops).into();
        let cadence = self.detector.detect(&flags);
        Self {
            state,
            flags,
            frame_rate,
            cadence,
            ops: ops.into(),
            detector: Arc::clone(&self.detector),
        }
    }
}

pub(crate) fn has_variable_frame_rate(flags: &[PictureFlag]) -> bool {
    flags.iter().any(PictureFlag::is_pulldown) && flags.iter().any(|flag| !flag.progressive)
}

/// Position ranges within an interlaced run over which one decimation cycle
/// is laid out.
fn phase_spans(
    flags: &[PictureFlag],
    run: RangeInclusive<usize>,
    phase: DecimationPhase,
) -> Vec<RangeInclusive<usize>> {
    match phase {
        DecimationPhase::PerRun => vec![run],
        DecimationPhase::PerGroup => {
            let (first, last) = run.into_inner();
            let mut spans = Vec::new();
            let mut start = first;
            for position in first + 1..=last {
                if flags[position].group_id != flags[position - 1].group_id {
                    spans.push(start..=position - 1);
                    start = position;
                }
            }
            spans.push(start..=last);
            spans
        }
    }
}

/// Build the sequence that results from applying `ops` to `flags`.
///
/// Duplicated pictures are emitted twice with `repeat_first_field` cleared;
/// deleted pictures are skipped. Every other picture passes through as is.
pub(crate) fn apply_ops(flags: &[PictureFlag], ops: &[NormalizationOp]) -> Vec<PictureFlag> {
    let mut edits: Vec<Option<NormalizationOp>> = vec![None; flags.len()];
    for op in ops {
        if let Some(slot) = edits.get_mut(op.position()) {
            *slot = Some(*op);
        }
    }

    let mut output = Vec::with_capacity(flags.len() + ops.len());
    for (flag, edit) in flags.iter().zip(edits) {
        match edit {
            None => output.push(*flag),
            Some(NormalizationOp::Delete(_)) => {}
            Some(NormalizationOp::Duplicate(_)) => {
                let materialized = PictureFlag {
                    repeat_first_field: false,
                    ..*flag
                };
                output.push(materialized);
                output.push(materialized);
            }
        }
    }
    output
}
