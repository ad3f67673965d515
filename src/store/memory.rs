use super::{newest_first, ProfileStore, SessionStore, Store, TimingStore};
use crate::classifier::Phases;
use crate::error::StoreError;
use crate::profile::Profile;
use crate::session::Session;
use crate::timing::{PhaseKind, TimingRecord};
use chrono::{DateTime, NaiveDate, Utc};

/// Volatile store used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    timings: Vec<TimingRecord>,
    sessions: Vec<Session>,
    profile: Option<Profile>,
    next_timing_id: u64,
    next_session_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimingStore for MemoryStore {
    fn append_timing(
        &mut self,
        kind: PhaseKind,
        duration_seconds: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        self.next_timing_id += 1;
        let id = self.next_timing_id.to_string();
        self.timings.push(TimingRecord {
            id: id.clone(),
            recorded_at,
            kind,
            duration_seconds,
        });
        Ok(id)
    }

    fn list_timings(&self) -> Result<Vec<TimingRecord>, StoreError> {
        Ok(newest_first(&self.timings, |t| t.recorded_at))
    }

    fn delete_timing(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.timings.len();
        self.timings.retain(|t| t.id != id);
        Ok(self.timings.len() != before)
    }

    fn clear_timings(&mut self) -> Result<(), StoreError> {
        self.timings.clear();
        Ok(())
    }
}

impl SessionStore for MemoryStore {
    fn append_session(
        &mut self,
        phases: &Phases,
        recorded_date: NaiveDate,
        recorded_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        self.next_session_id += 1;
        let id = self.next_session_id.to_string();
        self.sessions.push(Session {
            id: id.clone(),
            recorded_date,
            recorded_at,
            inhale_seconds: phases.inhale(),
            hold_seconds: phases.hold(),
            exhale_seconds: phases.exhale(),
        });
        Ok(id)
    }

    fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        Ok(newest_first(&self.sessions, |s| s.recorded_at))
    }

    fn clear_sessions(&mut self) -> Result<(), StoreError> {
        self.sessions.clear();
        Ok(())
    }
}

impl ProfileStore for MemoryStore {
    fn get_profile(&self) -> Result<Option<Profile>, StoreError> {
        Ok(self.profile.clone())
    }

    fn set_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        self.profile = Some(profile.clone());
        Ok(())
    }

    fn clear_profile(&mut self) -> Result<(), StoreError> {
        self.profile = None;
        Ok(())
    }
}

impl Store for MemoryStore {}
