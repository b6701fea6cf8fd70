//! Rational frame rates.
//!
//! MPEG frame rates such as 30000/1001 cannot be represented exactly as
//! floating point, and contraction multiplies them by `(cycle - 1) / cycle`,
//! so [`FrameRate`] keeps a reduced numerator/denominator pair.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::Serialize;

use crate::error::PulldownError;

/// A positive frame rate stored as a reduced fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FrameRate {
    numerator: u64,
    denominator: u64,
}

impl FrameRate {
    /// NTSC video rate, 30000/1001.
    pub const NTSC: FrameRate = FrameRate {
        numerator: 30000,
        denominator: 1001,
    };

    /// NTSC film rate, 24000/1001.
    pub const NTSC_FILM: FrameRate = FrameRate {
        numerator: 24000,
        denominator: 1001,
    };

    /// PAL video rate, 25/1.
    pub const PAL: FrameRate = FrameRate {
        numerator: 25,
        denominator: 1,
    };

    /// Create a frame rate, reducing the fraction.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::InvalidFrameRate`] if either part is zero.
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, PulldownError> {
        if numerator == 0 || denominator == 0 {
            return Err(PulldownError::InvalidFrameRate(format!(
                "{numerator}/{denominator}"
            )));
        }
        let divisor = gcd(numerator, denominator);
        Ok(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Frames per second as a float, for display.
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Multiply by `numerator / denominator`.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::InvalidFrameRate`] if the factor is zero or
    /// the product does not fit in 64 bits.
    pub fn scaled(&self, numerator: u64, denominator: u64) -> Result<Self, PulldownError> {
        let overflow = || {
            PulldownError::InvalidFrameRate(format!(
                "{self} scaled by {numerator}/{denominator} overflows"
            ))
        };
        FrameRate::new(
            self.numerator.checked_mul(numerator).ok_or_else(overflow)?,
            self.denominator.checked_mul(denominator).ok_or_else(overflow)?,
        )
    }

    /// The rate left after removing one frame out of every `cycle`.
    ///
    /// A cycle of 5 turns 30000/1001 into 24000/1001.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::InvalidCycle`] for a cycle below 2, since
    /// removing one of every one frame leaves nothing to play.
    pub fn decimated(&self, cycle: usize) -> Result<Self, PulldownError> {
        if cycle < 2 {
            return Err(PulldownError::InvalidCycle(cycle));
        }
        self.scaled(cycle as u64 - 1, cycle as u64)
    }
}

impl Display for FrameRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for FrameRate {
    type Err = PulldownError;

    /// Parse `"30000/1001"` or a whole number such as `"25"`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || PulldownError::InvalidFrameRate(trimmed.to_string());
        match trimmed.split_once('/') {
            Some((numerator, denominator)) => {
                let numerator = numerator.trim().parse::<u64>().map_err(|_| invalid())?;
                let denominator = denominator.trim().parse::<u64>().map_err(|_| invalid())?;
                FrameRate::new(numerator, denominator)
            }
            None => {
                let whole = trimmed.parse::<u64>().map_err(|_| invalid())?;
                FrameRate::new(whole, 1)
            }
        }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
