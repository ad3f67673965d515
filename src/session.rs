use crate::classifier::{classify, Classification, Phases};
use crate::error::BreathError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One matched inhale/hold/exhale triple, as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub recorded_date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
    pub inhale_seconds: f64,
    pub hold_seconds: f64,
    pub exhale_seconds: f64,
}

impl Session {
    pub fn phases(&self) -> Result<Phases, BreathError> {
        Phases::new(self.inhale_seconds, self.hold_seconds, self.exhale_seconds)
    }

    /// Classify this session; rows with a non-positive inhale are rejected
    /// rather than divided through.
    pub fn classify(&self) -> Result<Classification, BreathError> {
        Ok(classify(&self.phases()?))
    }
}

/// A session paired with its analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSession {
    #[serde(flatten)]
    pub session: Session,
    pub classification: Classification,
}
