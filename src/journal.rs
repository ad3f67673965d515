//! The journal ties a [`Store`] to a [`Clock`] and a [`SelectionPolicy`].
//!
//! It is constructed once at start-up and handed to whatever front end drives
//! it; there is no global instance.

use crate::classifier::Classification;
use crate::clock::{Clock, SystemClock};
use crate::error::{BreathError, Result};
use crate::profile::{Profile, ProfilePatch};
use crate::selection::{LatestOfEachKind, SelectionPolicy};
use crate::session::{ProcessedSession, Session};
use crate::stats::JournalStats;
use crate::store::Store;
use crate::timing::{validate_duration, PhaseKind, TimingRecord};
use chrono::Local;
use serde::Serialize;
use tracing::{debug, info, warn};

/// A stored session that could not be classified
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedSession {
    pub id: String,
    pub reason: String,
}

/// Result of classifying every stored session, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessReport {
    pub processed: Vec<ProcessedSession>,
    pub rejected: Vec<RejectedSession>,
}

pub struct Journal<S, C = SystemClock, P = LatestOfEachKind> {
    store: S,
    clock: C,
    policy: P,
}

impl<S: Store> Journal<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: Store, C: Clock> Journal<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            policy: LatestOfEachKind,
        }
    }
}

impl<S: Store, C: Clock, P: SelectionPolicy> Journal<S, C, P> {
    pub fn with_policy<Q: SelectionPolicy>(self, policy: Q) -> Journal<S, C, Q> {
        Journal {
            store: self.store,
            clock: self.clock,
            policy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn record_timing(&mut self, kind: PhaseKind, duration_seconds: f64) -> Result<String> {
        let duration_seconds = validate_duration(duration_seconds).inspect_err(|e| {
            warn!(%kind, error = %e, "rejected timing");
        })?;
        let id = self
            .store
            .append_timing(kind, duration_seconds, self.clock.now())?;
        debug!(%id, %kind, duration_seconds, "recorded timing");
        Ok(id)
    }

    pub fn timings(&self) -> Result<Vec<TimingRecord>> {
        Ok(self.store.list_timings()?)
    }

    pub fn delete_timing(&mut self, id: &str) -> Result<()> {
        if self.store.delete_timing(id)? {
            debug!(%id, "deleted timing");
            Ok(())
        } else {
            Err(BreathError::NotFound {
                what: "Timing record",
                id: id.to_string(),
            })
        }
    }

    /// Assemble a session from the current timings. Nothing is written unless
    /// every phase is present and the inhale is positive.
    pub fn save_session(&mut self) -> Result<String> {
        let timings = self.store.list_timings()?;
        let phases = self.policy.select(&timings).inspect_err(|e| {
            warn!(error = %e, "session not saved");
        })?;

        let recorded_at = self.clock.now();
        let recorded_date = recorded_at.with_timezone(&Local).date_naive();
        let id = self
            .store
            .append_session(&phases, recorded_date, recorded_at)?;
        debug!(
            %id,
            inhale = phases.inhale(),
            hold = phases.hold(),
            exhale = phases.exhale(),
            "saved session"
        );
        Ok(id)
    }

    pub fn sessions(&self) -> Result<Vec<Session>> {
        Ok(self.store.list_sessions()?)
    }

    /// Classify every stored session. Rows that fail validation are reported
    /// separately instead of being coerced.
    pub fn process_sessions(&self) -> Result<ProcessReport> {
        let mut report = ProcessReport::default();

        for session in self.store.list_sessions()? {
            match session.classify() {
                Ok(classification) => report.processed.push(ProcessedSession {
                    session,
                    classification,
                }),
                Err(e) => {
                    warn!(id = %session.id, error = %e, "skipping session");
                    report.rejected.push(RejectedSession {
                        id: session.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            processed = report.processed.len(),
            rejected = report.rejected.len(),
            "processed sessions"
        );
        Ok(report)
    }

    /// Classify one stored session by id
    pub fn classify_session(&self, id: &str) -> Result<Classification> {
        let session = self
            .store
            .list_sessions()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| BreathError::NotFound {
                what: "Session",
                id: id.to_string(),
            })?;
        session.classify()
    }

    pub fn profile(&self) -> Result<Option<Profile>> {
        Ok(self.store.get_profile()?)
    }

    /// Overwrite the profile slot, stamping the update time
    pub fn set_profile(&mut self, mut profile: Profile) -> Result<Profile> {
        profile.updated = Some(self.clock.now());
        self.store.set_profile(&profile)?;
        debug!("profile saved");
        Ok(profile)
    }

    /// Merge `patch` into the current profile (or an empty one) and save it
    pub fn update_profile(&mut self, patch: ProfilePatch) -> Result<Profile> {
        if patch.is_empty() {
            return Err(BreathError::Validation(
                "no profile fields were provided".to_string(),
            ));
        }
        let current = self.store.get_profile()?.unwrap_or_default();
        self.set_profile(patch.apply(current))
    }

    pub fn stats(&self) -> Result<JournalStats> {
        let timings = self.store.list_timings()?;
        let sessions = self.store.list_sessions()?;
        Ok(JournalStats::from_records(&timings, sessions.len()))
    }

    /// Remove all timings, sessions and the profile
    pub fn clear_all(&mut self) -> Result<()> {
        self.store.clear_all()?;
        info!("cleared all breath data");
        Ok(())
    }
}
