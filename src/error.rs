//! Error types for the `pulldown` crate.
//!
//! This module defines [`PulldownError`], the unified error type returned by
//! all fallible operations in the crate. Heuristic uncertainty is never an
//! error: a cadence detector that finds nothing returns
//! [`Cadence::none`](crate::Cadence::none), not a `PulldownError`.

use std::io::Error as IoError;

use serde_json::Error as JsonError;
use thiserror::Error;

/// The unified error type for all `pulldown` operations.
///
/// Every public method that can fail returns `Result<T, PulldownError>`.
/// Parameter errors are raised before any sequence is touched, so a failed
/// call never leaves a half-transformed result behind.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PulldownError {
    /// The index could not be parsed into picture flag records.
    #[error("Malformed index at line {line}: {reason}")]
    MalformedIndex {
        /// 1-based line number in the source (0 when not line-oriented).
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// The index parsed correctly but contains no pictures.
    #[error("Index contains no pictures")]
    EmptySequence,

    /// The index was written by an unsupported indexer version.
    #[error("Unsupported index version: {0}")]
    UnsupportedIndexVersion(String),

    /// Contraction was requested without a cycle and none was detected.
    #[error("No pulldown cadence detected and no cycle was given")]
    NoCadence,

    /// A cycle of zero was supplied.
    #[error("Invalid cycle {0}: cycle must be at least 1")]
    InvalidCycle(usize),

    /// Offsets are empty, too many for the cycle, or out of range.
    #[error("Invalid offsets {offsets:?} for cycle {cycle}: {reason}")]
    InvalidOffsets {
        /// The offending offsets.
        offsets: Vec<usize>,
        /// The cycle they were checked against.
        cycle: usize,
        /// Which precondition failed.
        reason: String,
    },

    /// A frame rate was zero, had a zero denominator, or did not parse.
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(String),

    /// A deinterlacer rate factor other than single or double rate.
    #[error("Unsupported field rate: {0}")]
    UnsupportedFieldRate(String),

    /// An I/O error occurred while reading an index.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// A JSON picture list could not be decoded.
    #[error("JSON error: {0}")]
    JsonError(#[from] JsonError),
}

impl PulldownError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        PulldownError::MalformedIndex {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_offsets(
        offsets: &[usize],
        cycle: usize,
        reason: impl Into<String>,
    ) -> Self {
        PulldownError::InvalidOffsets {
            offsets: offsets.to_vec(),
            cycle,
            reason: reason.into(),
        }
    }
}
