use crate::error::BreathError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One phase of a breathing cycle
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
pub enum PhaseKind {
    Inhalation,
    #[serde(rename = "Breath-Hold")]
    #[strum(serialize = "Breath-Hold")]
    BreathHold,
    Exhalation,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 3] = [
        PhaseKind::Inhalation,
        PhaseKind::BreathHold,
        PhaseKind::Exhalation,
    ];
}

/// Inverse of `Display`; only the stored names are accepted
impl FromStr for PhaseKind {
    type Err = BreathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhaseKind::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| BreathError::Validation(format!("unknown phase kind '{s}'")))
    }
}

/// A single measured duration for one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingRecord {
    pub id: String,
    pub recorded_at: DateTime<Utc>,
    pub kind: PhaseKind,
    pub duration_seconds: f64,
}

/// Durations must be finite and non-negative before they are stored
pub fn validate_duration(seconds: f64) -> Result<f64, BreathError> {
    if !seconds.is_finite() {
        return Err(BreathError::Validation(format!(
            "duration must be a finite number of seconds, got {seconds}"
        )));
    }
    if seconds < 0.0 {
        return Err(BreathError::Validation(format!(
            "duration must not be negative, got {seconds}"
        )));
    }
    Ok(seconds)
}
