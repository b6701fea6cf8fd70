//! Core [`IndexedSource`] implementation.
//!
//! `IndexedSource` is the main entry point for the crate. It loads a picture
//! index, detects the pulldown cadence once, settles fully progressive
//! sources, and hands out normalized sequences on request without ever
//! modifying what it loaded.

use std::path::Path;

use crate::cadence::Cadence;
use crate::configuration::NormalizeOptions;
use crate::error::PulldownError;
use crate::flags::FlagStore;
use crate::normalize::{NormalizedSequence, RateState};
use crate::validation::{self, ValidationReport};
use crate::variable_framerate::{VariableFrameRateAnalysis, VideoStandard};

/// A loaded picture index and its analysis.
///
/// # Example
///
/// ```no_run
/// use pulldown::{IndexedSource, NormalizeOptions, RateMode};
///
/// let source = IndexedSource::open("episode.d2v")?;
/// println!("{}", source.cadence());
///
/// let ceiled = source.normalize(&NormalizeOptions::new().with_mode(RateMode::Expand))?;
/// println!("{} frames at {}", ceiled.len(), ceiled.frame_rate());
/// # Ok::<(), pulldown::PulldownError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IndexedSource {
    store: FlagStore,
    analysis: VariableFrameRateAnalysis,
    initial: NormalizedSequence,
}

impl IndexedSource {
    /// Open an index (D2V or JSON) with default options.
    ///
    /// # Errors
    ///
    /// Returns any [`FlagStore::open`] error, and
    /// [`PulldownError::InvalidFrameRate`] if the index has no frame rate.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PulldownError> {
        Self::open_with_options(path, &NormalizeOptions::new())
    }

    /// Open an index, honoring the frame-rate override and progressive
    /// settling choice in `options`.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        options: &NormalizeOptions,
    ) -> Result<Self, PulldownError> {
        Self::from_store(FlagStore::open(path)?, options)
    }

    /// Analyze an already loaded store.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::InvalidFrameRate`] if neither `options` nor
    /// the store provide a frame rate.
    pub fn from_store(store: FlagStore, options: &NormalizeOptions) -> Result<Self, PulldownError> {
        let frame_rate = options
            .frame_rate()
            .or(store.frame_rate())
            .ok_or_else(|| {
                PulldownError::InvalidFrameRate("the index does not specify a frame rate".into())
            })?;

        let analysis = VariableFrameRateAnalysis::from_flags(store.flags());
        let mut initial = NormalizedSequence::new(&store, frame_rate);
        log::info!(
            "Indexed {} pictures at {} ({:.2}% progressive, {})",
            analysis.total_pictures,
            frame_rate,
            analysis.progressive_percentage,
            initial.cadence()
        );

        // A fully progressive stream has nothing to decimate, but it may have
        // been indexed at the video rate; contracting only retags the rate.
        if options.settle_progressive()
            && analysis.is_fully_progressive()
            && !analysis.is_variable_frame_rate
            && initial.cadence().is_detected()
        {
            initial = initial
                .contract(None, None, options.decimation_phase())?
                .without_cadence();
            log::info!(
                "Fully progressive source settled at {}",
                initial.frame_rate()
            );
        }

        Ok(Self {
            store,
            analysis,
            initial,
        })
    }

    pub fn store(&self) -> &FlagStore {
        &self.store
    }

    pub fn analysis(&self) -> &VariableFrameRateAnalysis {
        &self.analysis
    }

    /// Cadence of the initial sequence; [`Cadence::none`] once settled.
    pub fn cadence(&self) -> &Cadence {
        self.initial.cadence()
    }

    /// The sequence every normalization starts from.
    pub fn initial(&self) -> &NormalizedSequence {
        &self.initial
    }

    /// `true` when loading already moved the source to a constant rate.
    pub fn is_settled(&self) -> bool {
        self.initial.state() != RateState::VariableRate
    }

    pub fn standard(&self) -> VideoStandard {
        VideoStandard::from_frame_rate(self.initial.frame_rate())
    }

    /// Run one normalization pass from the initial sequence.
    ///
    /// # Errors
    ///
    /// See [`NormalizedSequence::contract`].
    pub fn normalize(&self, options: &NormalizeOptions) -> Result<NormalizedSequence, PulldownError> {
        self.initial.normalize(options)
    }

    /// Validate the loaded flags.
    pub fn validate(&self) -> ValidationReport {
        validation::validate_flags(self.store.flags(), Some(self.initial.frame_rate()))
    }
}
