//! Persistence interfaces for timing records, sessions and the profile.
//!
//! Each store owns its records. Listings come back newest first; records
//! sharing a timestamp are ordered by insertion, newest first.

#[cfg(test)]
pub(crate) mod contract;
mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::classifier::Phases;
use crate::error::StoreError;
use crate::profile::Profile;
use crate::session::Session;
use crate::timing::{PhaseKind, TimingRecord};
use chrono::{DateTime, NaiveDate, Utc};

pub trait TimingStore {
    fn append_timing(
        &mut self,
        kind: PhaseKind,
        duration_seconds: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<String, StoreError>;

    fn list_timings(&self) -> Result<Vec<TimingRecord>, StoreError>;

    /// Returns false when no record has this id
    fn delete_timing(&mut self, id: &str) -> Result<bool, StoreError>;

    fn clear_timings(&mut self) -> Result<(), StoreError>;
}

pub trait SessionStore {
    fn append_session(
        &mut self,
        phases: &Phases,
        recorded_date: NaiveDate,
        recorded_at: DateTime<Utc>,
    ) -> Result<String, StoreError>;

    fn list_sessions(&self) -> Result<Vec<Session>, StoreError>;

    fn clear_sessions(&mut self) -> Result<(), StoreError>;
}

pub trait ProfileStore {
    fn get_profile(&self) -> Result<Option<Profile>, StoreError>;

    fn set_profile(&mut self, profile: &Profile) -> Result<(), StoreError>;

    fn clear_profile(&mut self) -> Result<(), StoreError>;
}

/// Everything the journal needs from a backend
pub trait Store: TimingStore + SessionStore + ProfileStore {
    fn clear_all(&mut self) -> Result<(), StoreError> {
        self.clear_timings()?;
        self.clear_sessions()?;
        self.clear_profile()
    }
}

/// Newest first; ties keep later insertions ahead of earlier ones.
/// `items` must be in insertion order.
pub(crate) fn newest_first<T: Clone>(items: &[T], at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut sorted: Vec<T> = items.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| at(b).cmp(&at(a)));
    sorted
}
