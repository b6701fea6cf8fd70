//! Flag index validation.
//!
//! [`validate_flags`] inspects a picture flag sequence and returns a
//! [`ValidationReport`] describing its composition and anything that may
//! make cadence detection or normalization unreliable.
//!
//! # Example
//!
//! ```no_run
//! use pulldown::IndexedSource;
//!
//! let source = IndexedSource::open("episode.d2v")?;
//! let report = source.validate();
//! if report.is_valid() {
//!     println!("Index is usable");
//! } else {
//!     for warning in &report.warnings {
//!         println!("Warning: {warning}");
//!     }
//! }
//! # Ok::<(), pulldown::PulldownError>(())
//! ```

use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

use crate::cadence::{self, Cadence};
use crate::flags::PictureFlag;
use crate::rational::FrameRate;
use crate::segment::{self, RunKind};
use crate::variable_framerate::{VariableFrameRateAnalysis, VideoStandard};

/// Summary of index validation.
///
/// Contains lists of informational notices, warnings, and errors found during
/// validation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Issues that may make cadence detection or normalization unreliable.
    pub warnings: Vec<String>,
    /// Issues that prevent normalization.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found.
    ///
    /// Warnings do not affect this result, only errors make the report
    /// invalid.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of issues (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Run validation checks over a flag sequence.
pub fn validate_flags(flags: &[PictureFlag], frame_rate: Option<FrameRate>) -> ValidationReport {
    let mut report = ValidationReport::default();

    if flags.is_empty() {
        report.errors.push("Index contains no pictures".to_string());
        return report;
    }

    // ── Composition ────────────────────────────────────────────────
    let analysis = VariableFrameRateAnalysis::from_flags(flags);
    report.info.push(format!(
        "Progressive: {:05.2}% ({}), Interlaced: {:05.2}% ({})",
        analysis.progressive_percentage,
        analysis.progressive_pictures,
        100.0 - analysis.progressive_percentage,
        analysis.interlaced_pictures,
    ));
    report.info.push(format!(
        "VFR: {}",
        if analysis.is_variable_frame_rate { "yes" } else { "no" }
    ));

    // ── Frame rate ─────────────────────────────────────────────────
    match frame_rate {
        Some(rate) => {
            let standard = VideoStandard::from_frame_rate(rate);
            report
                .info
                .push(format!("Frame rate: {rate} ({:.3} fps, {standard})", rate.as_f64()));
            if standard == VideoStandard::Pal && analysis.pulldown_pictures > 0 {
                report.warnings.push(
                    "PAL frame rate with pulldown flags; the cadence is unlikely to be telecine"
                        .to_string(),
                );
            }
        }
        None => report.errors.push(
            "No frame rate in the index; pass one explicitly before normalizing".to_string(),
        ),
    }

    // ── Cadence ────────────────────────────────────────────────────
    let detected = cadence::detect(flags);
    match &detected.pattern {
        Some(pattern) => report
            .info
            .push(format!("Pulldown {pattern} (cycle {})", detected.cycle)),
        None => report.info.push("No pulldown".to_string()),
    }
    let segment_gaps = cadence::segment_modal_gaps(flags);
    let disagreeing = segment_gaps
        .iter()
        .filter(|&&gap| Cadence::from_cycle(gap + 1) != detected)
        .count();
    if disagreeing > 0 {
        report.warnings.push(format!(
            "{disagreeing} of {} progressive segments disagree with the detected cadence; \
             segments next to interlaced sections are the usual cause",
            segment_gaps.len(),
        ));
    }

    // ── Interlaced repeats ─────────────────────────────────────────
    let interlaced_repeats = flags
        .iter()
        .filter(|flag| !flag.progressive && flag.repeat_first_field)
        .count();
    if interlaced_repeats > 0 {
        report.warnings.push(format!(
            "{interlaced_repeats} interlaced pictures carry repeat_first_field; \
             those repeats are not materialized by normalization"
        ));
    }

    // ── Field order ────────────────────────────────────────────────
    let mixed_order_runs = segment::segment(flags)
        .into_iter()
        .filter(|run| run.kind == RunKind::Interlaced)
        .filter(|run| {
            let first = flags[run.start].top_field_first;
            flags[run.positions()]
                .iter()
                .any(|flag| flag.top_field_first != first)
        })
        .count();
    if mixed_order_runs > 0 {
        report.info.push(format!(
            "{mixed_order_runs} interlaced runs switch field order"
        ));
    }

    // ── Groups ─────────────────────────────────────────────────────
    let mut seen = HashSet::new();
    let mut reappearing = Vec::new();
    let mut previous = None;
    for flag in flags {
        if previous != Some(flag.group_id) {
            if !seen.insert(flag.group_id) && !reappearing.contains(&flag.group_id) {
                reappearing.push(flag.group_id);
            }
            previous = Some(flag.group_id);
        }
    }
    report.info.push(format!("{} source groups", seen.len()));
    if !reappearing.is_empty() {
        report.warnings.push(format!(
            "Groups {reappearing:?} appear in more than one place; each occurrence gets its own range"
        ));
    }

    report
}
