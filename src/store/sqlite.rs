use super::{ProfileStore, SessionStore, Store, TimingStore};
use crate::classifier::Phases;
use crate::error::StoreError;
use crate::profile::Profile;
use crate::session::Session;
use crate::timing::{PhaseKind, TimingRecord};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS timings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        recorded_at TEXT NOT NULL,
        kind TEXT NOT NULL,
        duration_seconds REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_timings_recorded_at ON timings(recorded_at);

    CREATE TABLE IF NOT EXISTS sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        recorded_date TEXT NOT NULL,
        recorded_at TEXT NOT NULL,
        inhale_seconds REAL NOT NULL,
        hold_seconds REAL NOT NULL,
        exhale_seconds REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sessions_recorded_at ON sessions(recorded_at);

    CREATE TABLE IF NOT EXISTS profile (
        slot INTEGER PRIMARY KEY CHECK (slot = 1),
        body TEXT NOT NULL
    );
"#;

/// Durable store backed by a single SQLite file
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened breath database");
        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, path })
    }

    /// Location on disk, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

// Fixed-width UTC text sorts the same as the instant it encodes.
fn encode_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_time(table: &'static str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            table,
            reason: format!("bad timestamp '{raw}': {e}"),
        })
}

impl TimingStore for SqliteStore {
    fn append_timing(
        &mut self,
        kind: PhaseKind,
        duration_seconds: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        self.conn.execute(
            "INSERT INTO timings (recorded_at, kind, duration_seconds) VALUES (?1, ?2, ?3)",
            params![encode_time(recorded_at), kind.to_string(), duration_seconds],
        )?;
        let id = self.conn.last_insert_rowid().to_string();
        debug!(%id, %kind, duration_seconds, "stored timing");
        Ok(id)
    }

    fn list_timings(&self) -> Result<Vec<TimingRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, recorded_at, kind, duration_seconds
            FROM timings
            ORDER BY recorded_at DESC, id DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, recorded_at, kind, duration_seconds) = row?;
            let kind = kind.parse::<PhaseKind>().map_err(|_| StoreError::Corrupt {
                table: "timings",
                reason: format!("unknown kind '{kind}' in row {id}"),
            })?;
            records.push(TimingRecord {
                id: id.to_string(),
                recorded_at: decode_time("timings", &recorded_at)?,
                kind,
                duration_seconds,
            });
        }

        Ok(records)
    }

    fn delete_timing(&mut self, id: &str) -> Result<bool, StoreError> {
        // "01" or "+1" parse to a live rowid but were never issued
        let rowid = match id.parse::<i64>() {
            Ok(rowid) if rowid.to_string() == id => rowid,
            _ => return Ok(false),
        };
        let deleted = self
            .conn
            .execute("DELETE FROM timings WHERE id = ?1", [rowid])?;
        Ok(deleted > 0)
    }

    fn clear_timings(&mut self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM timings", [])?;
        Ok(())
    }
}

impl SessionStore for SqliteStore {
    fn append_session(
        &mut self,
        phases: &Phases,
        recorded_date: NaiveDate,
        recorded_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        // single INSERT, so the three durations land together or not at all
        self.conn.execute(
            r#"
            INSERT INTO sessions
            (recorded_date, recorded_at, inhale_seconds, hold_seconds, exhale_seconds)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                recorded_date.format("%Y-%m-%d").to_string(),
                encode_time(recorded_at),
                phases.inhale(),
                phases.hold(),
                phases.exhale(),
            ],
        )?;
        let id = self.conn.last_insert_rowid().to_string();
        debug!(%id, "stored session");
        Ok(id)
    }

    fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, recorded_date, recorded_at, inhale_seconds, hold_seconds, exhale_seconds
            FROM sessions
            ORDER BY recorded_at DESC, id DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, recorded_date, recorded_at, inhale, hold, exhale) = row?;
            let recorded_date = NaiveDate::parse_from_str(&recorded_date, "%Y-%m-%d")
                .map_err(|e| StoreError::Corrupt {
                    table: "sessions",
                    reason: format!("bad date '{recorded_date}' in row {id}: {e}"),
                })?;
            sessions.push(Session {
                id: id.to_string(),
                recorded_date,
                recorded_at: decode_time("sessions", &recorded_at)?,
                inhale_seconds: inhale,
                hold_seconds: hold,
                exhale_seconds: exhale,
            });
        }

        Ok(sessions)
    }

    fn clear_sessions(&mut self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM sessions", [])?;
        Ok(())
    }
}

impl ProfileStore for SqliteStore {
    fn get_profile(&self) -> Result<Option<Profile>, StoreError> {
        let body: Option<String> = self
            .conn
            .query_row("SELECT body FROM profile WHERE slot = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    fn set_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        let body = serde_json::to_string(profile)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO profile (slot, body) VALUES (1, ?1)",
            [body],
        )?;
        Ok(())
    }

    fn clear_profile(&mut self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM profile", [])?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn clear_all(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM timings", [])?;
        tx.execute("DELETE FROM sessions", [])?;
        tx.execute("DELETE FROM profile", [])?;
        tx.commit()?;
        Ok(())
    }
}
