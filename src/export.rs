use crate::error::StoreError;
use crate::session::ProcessedSession;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    date: String,
    recorded_at: String,
    inhale_seconds: f64,
    hold_seconds: f64,
    exhale_seconds: f64,
    hold_ratio: String,
    exhale_ratio: String,
    deviation: String,
    category: String,
}

impl<'a> From<&'a ProcessedSession> for ExportRow<'a> {
    fn from(p: &'a ProcessedSession) -> Self {
        let c = &p.classification;
        Self {
            id: &p.session.id,
            date: p.session.recorded_date.to_string(),
            recorded_at: p.session.recorded_at.to_rfc3339(),
            inhale_seconds: p.session.inhale_seconds,
            hold_seconds: p.session.hold_seconds,
            exhale_seconds: p.session.exhale_seconds,
            hold_ratio: format!("{:.2}", c.hold_ratio),
            exhale_ratio: format!("{:.2}", c.exhale_ratio),
            deviation: format!("{:.2}", c.deviation),
            category: c.category.to_string(),
        }
    }
}

/// Write processed sessions as CSV with a header row. Ratios and deviation
/// are rounded for display; raw durations are written as stored.
pub fn write_sessions_csv<W: Write>(
    writer: W,
    sessions: &[ProcessedSession],
) -> Result<(), StoreError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for session in sessions {
        wtr.serialize(ExportRow::from(session))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use chrono::{TimeZone, Utc};

    fn processed(id: &str, inhale: f64, hold: f64, exhale: f64) -> ProcessedSession {
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 18, 45, 0).unwrap();
        let session = Session {
            id: id.into(),
            recorded_date: at.date_naive(),
            recorded_at: at,
            inhale_seconds: inhale,
            hold_seconds: hold,
            exhale_seconds: exhale,
        };
        ProcessedSession {
            classification: session.classify().unwrap(),
            session,
        }
    }

    #[test]
    fn writes_header_and_rounded_rows() {
        let rows = vec![processed("1", 5.0, 10.0, 20.0), processed("2", 4.0, 16.0, 8.0)];
        let mut out = Vec::new();
        write_sessions_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "id,date,recorded_at,inhale_seconds,hold_seconds,exhale_seconds,hold_ratio,exhale_ratio,deviation,category"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,2024-02-29,"));
        assert!(lines[1].ends_with(",2.00,4.00,2.83,Needs Attention"));
        assert!(lines[2].ends_with(",4.00,2.00,0.00,Healthy"));
    }

    #[test]
    fn empty_export_writes_nothing() {
        let mut out = Vec::new();
        write_sessions_csv(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
