use crate::timing::{PhaseKind, TimingRecord};
use crate::util::{mean, std_dev};
use serde::Serialize;

/// Aggregate figures for one phase kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSummary {
    pub kind: PhaseKind,
    pub count: usize,
    /// Mean duration in seconds, 0 when nothing has been recorded
    pub average_seconds: f64,
    pub std_dev_seconds: Option<f64>,
}

/// Totals across the whole journal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalStats {
    pub total_timings: usize,
    pub total_sessions: usize,
    pub phases: Vec<PhaseSummary>,
}

impl JournalStats {
    pub fn from_records(timings: &[TimingRecord], total_sessions: usize) -> Self {
        let phases = PhaseKind::ALL
            .iter()
            .map(|&kind| summarize(timings, kind))
            .collect();

        Self {
            total_timings: timings.len(),
            total_sessions,
            phases,
        }
    }

    pub fn phase(&self, kind: PhaseKind) -> Option<&PhaseSummary> {
        self.phases.iter().find(|p| p.kind == kind)
    }
}

fn summarize(timings: &[TimingRecord], kind: PhaseKind) -> PhaseSummary {
    let durations: Vec<f64> = timings
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.duration_seconds)
        .collect();

    PhaseSummary {
        kind,
        count: durations.len(),
        average_seconds: mean(&durations).unwrap_or(0.0),
        std_dev_seconds: std_dev(&durations),
    }
}
