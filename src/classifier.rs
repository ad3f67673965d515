//! Ratio analysis of a breathing session against the 1:4:2
//! (inhale:hold:exhale) pattern.
//!
//! `classify` is total over [`Phases`]; the guard against a zero or negative
//! inhale, or one so small the ratios overflow, lives in [`Phases::new`], so an
//! invalid triple can never reach the ratio math and every result is finite.

use crate::error::BreathError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hold duration as a multiple of inhale, in the ideal pattern
pub const IDEAL_HOLD_RATIO: f64 = 4.0;
/// Exhale duration as a multiple of inhale, in the ideal pattern
pub const IDEAL_EXHALE_RATIO: f64 = 2.0;
/// Upper bound (inclusive) of the Healthy band
pub const HEALTHY_MAX_DEVIATION: f64 = 1.0;
/// Upper bound (inclusive) of the Borderline band
pub const BORDERLINE_MAX_DEVIATION: f64 = 2.0;

/// A validated inhale/hold/exhale triple, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phases {
    inhale: f64,
    hold: f64,
    exhale: f64,
}

impl Phases {
    pub fn new(inhale: f64, hold: f64, exhale: f64) -> Result<Self, BreathError> {
        if !inhale.is_finite() || inhale <= 0.0 {
            return Err(BreathError::InvalidSession(format!(
                "inhale must be greater than zero, got {inhale}"
            )));
        }
        for (name, value) in [("hold", hold), ("exhale", exhale)] {
            if !value.is_finite() || value < 0.0 {
                return Err(BreathError::InvalidSession(format!(
                    "{name} must be a non-negative number of seconds, got {value}"
                )));
            }
        }
        // a tiny inhale can push the ratios past f64::MAX
        if !deviation_from_ideal(hold / inhale, exhale / inhale).is_finite() {
            return Err(BreathError::InvalidSession(format!(
                "inhale of {inhale}s is too short to compare against hold {hold}s and exhale {exhale}s"
            )));
        }
        Ok(Self {
            inhale,
            hold,
            exhale,
        })
    }

    pub fn inhale(&self) -> f64 {
        self.inhale
    }

    pub fn hold(&self) -> f64 {
        self.hold
    }

    pub fn exhale(&self) -> f64 {
        self.exhale
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum Category {
    Healthy,
    Borderline,
    #[serde(rename = "Needs Attention")]
    #[strum(serialize = "Needs Attention")]
    NeedsAttention,
}

impl Category {
    /// Bands are closed on their upper edge: 1.0 is Healthy, 2.0 is Borderline.
    pub fn from_deviation(deviation: f64) -> Self {
        if deviation <= HEALTHY_MAX_DEVIATION {
            Category::Healthy
        } else if deviation <= BORDERLINE_MAX_DEVIATION {
            Category::Borderline
        } else {
            Category::NeedsAttention
        }
    }
}

/// Derived, non-persisted analysis of one session. Values keep full
/// precision; rounding happens only in `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub hold_ratio: f64,
    pub exhale_ratio: f64,
    pub deviation: f64,
    pub category: Category,
}

pub fn classify(phases: &Phases) -> Classification {
    let hold_ratio = phases.hold / phases.inhale;
    let exhale_ratio = phases.exhale / phases.inhale;
    let deviation = deviation_from_ideal(hold_ratio, exhale_ratio);

    Classification {
        hold_ratio,
        exhale_ratio,
        deviation,
        category: Category::from_deviation(deviation),
    }
}

/// Euclidean distance from (hold_ratio, exhale_ratio) to the ideal point (4, 2)
pub fn deviation_from_ideal(hold_ratio: f64, exhale_ratio: f64) -> f64 {
    (hold_ratio - IDEAL_HOLD_RATIO).hypot(exhale_ratio - IDEAL_EXHALE_RATIO)
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "1 : {:.2} : {:.2}  deviation {:.2}  {}",
            self.hold_ratio, self.exhale_ratio, self.deviation, self.category
        )
    }
}
