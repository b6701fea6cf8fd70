//! # pulldown
//!
//! Telecine cadence detection and variable to constant frame rate
//! normalization for interlaced MPEG video, driven entirely by per-picture
//! coding flags (`progressive_frame`, `repeat_first_field`,
//! `top_field_first`) read from a DGIndex project file or a JSON picture
//! list.
//!
//! ## Quick Start
//!
//! ### Detect the Cadence
//!
//! ```no_run
//! use pulldown::IndexedSource;
//!
//! let source = IndexedSource::open("episode.d2v").unwrap();
//! println!("{}", source.cadence()); // e.g. "2:3 (cycle 5)"
//! ```
//!
//! ### Normalize to a Constant Rate
//!
//! ```no_run
//! use pulldown::{IndexedSource, NormalizeOptions, RateMode};
//!
//! let source = IndexedSource::open("episode.d2v").unwrap();
//!
//! // Duplicate pulldown frames (nothing is lost).
//! let ceiled = source.normalize(&NormalizeOptions::new().with_mode(RateMode::Expand)).unwrap();
//!
//! // Or decimate interlaced sections down to the film rate.
//! let floored = source.normalize(&NormalizeOptions::new().with_mode(RateMode::Contract)).unwrap();
//! println!("{} frames at {}", floored.len(), floored.frame_rate());
//! ```
//!
//! ### Tag Frames for a Deinterlacer
//!
//! ```no_run
//! use pulldown::{DeinterlacePlan, FieldRate, IndexedSource};
//!
//! let source = IndexedSource::open("episode.d2v").unwrap();
//! let tags = source.initial().tag();
//! let plan = DeinterlacePlan::build(&tags.tags, FieldRate::Double);
//! println!("group ranges: {}", tags.vob_map);
//! ```
//!
//! ## Features
//!
//! - **Index loading**: DGIndex v16 `.d2v` files and JSON picture lists
//! - **Cadence detection**: modal repeat-gap heuristic behind a swappable
//!   [`CadenceDetector`] trait
//! - **Run segmentation**: alternating progressive/interlaced runs
//! - **Ceil / floor normalization**: duplicate pulldown frames or decimate
//!   interlaced runs, as immutable snapshots with a one-way state token
//! - **Decimation**: generic cycle/offset selection, globally or per group
//! - **Provenance**: per-frame tags and group index maps for downstream
//!   filters
//! - **Validation**: reports on composition, cadence stability and groups

pub mod cadence;
pub mod configuration;
pub mod d2v;
pub mod decimate;
pub mod deinterlace;
pub mod error;
pub mod flags;
pub mod normalize;
pub mod provenance;
pub mod rational;
pub mod segment;
pub mod source;
pub mod validation;
pub mod variable_framerate;

pub use cadence::{Cadence, CadenceDetector, FixedCadence, ModalGapDetector};
pub use configuration::{DecimationPhase, NormalizeOptions, RateMode};
pub use d2v::{D2vEntry, D2vIndex, D2vSettings};
pub use decimate::{Decimation, decimate_per_group, select};
pub use deinterlace::{DeinterlacePlan, FieldRate, FrameAction};
pub use error::PulldownError;
pub use flags::{Classification, FieldOrder, FlagRecord, FlagStore, PictureFlag};
pub use normalize::{NormalizationOp, NormalizedSequence, RateState};
pub use provenance::{FrameTag, FrameTags, GroupRange, VobIndexMap, tag};
pub use rational::FrameRate;
pub use segment::{Run, RunKind, group_by_contiguous_index};
pub use source::IndexedSource;
pub use validation::{ValidationReport, validate_flags};
pub use variable_framerate::{VariableFrameRateAnalysis, VideoStandard};
