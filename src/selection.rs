use crate::classifier::Phases;
use crate::error::BreathError;
use crate::timing::{PhaseKind, TimingRecord};

/// Chooses which timing records populate a new session
pub trait SelectionPolicy {
    fn select(&self, newest_first: &[TimingRecord]) -> Result<Phases, BreathError>;
}

/// Takes the most recent record of each kind from a newest-first listing.
/// Fails if any kind has never been recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestOfEachKind;

impl LatestOfEachKind {
    fn latest(records: &[TimingRecord], kind: PhaseKind) -> Result<&TimingRecord, BreathError> {
        records.iter().find(|r| r.kind == kind).ok_or_else(|| {
            BreathError::InvalidSession(format!("no {kind} timing has been recorded"))
        })
    }
}

impl SelectionPolicy for LatestOfEachKind {
    fn select(&self, newest_first: &[TimingRecord]) -> Result<Phases, BreathError> {
        let inhale = Self::latest(newest_first, PhaseKind::Inhalation)?;
        let hold = Self::latest(newest_first, PhaseKind::BreathHold)?;
        let exhale = Self::latest(newest_first, PhaseKind::Exhalation)?;

        Phases::new(
            inhale.duration_seconds,
            hold.duration_seconds,
            exhale.duration_seconds,
        )
    }
}
