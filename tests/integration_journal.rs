use assert_matches::assert_matches;
use breathlog::{
    store::{SqliteStore, TimingStore},
    BreathError, Category, Journal, PhaseKind,
};
use tempfile::tempdir;

// End-to-end flows through the journal backed by an on-disk database.

fn record_cycle(journal: &mut Journal<SqliteStore>, inhale: f64, hold: f64, exhale: f64) {
    journal.record_timing(PhaseKind::Inhalation, inhale).unwrap();
    journal.record_timing(PhaseKind::BreathHold, hold).unwrap();
    journal.record_timing(PhaseKind::Exhalation, exhale).unwrap();
}

#[test]
fn ideal_cycle_is_classified_healthy() {
    let dir = tempdir().unwrap();
    let mut journal = Journal::new(SqliteStore::open(dir.path().join("breath.db")).unwrap());

    record_cycle(&mut journal, 4.0, 16.0, 8.0);
    journal.save_session().unwrap();

    let report = journal.process_sessions().unwrap();
    assert_eq!(report.processed.len(), 1);
    let c = report.processed[0].classification;
    assert_eq!(format!("{:.2}", c.hold_ratio), "4.00");
    assert_eq!(format!("{:.2}", c.exhale_ratio), "2.00");
    assert_eq!(format!("{:.2}", c.deviation), "0.00");
    assert_eq!(c.category, Category::Healthy);
}

#[test]
fn batch_processing_covers_every_band() {
    let dir = tempdir().unwrap();
    let mut journal = Journal::new(SqliteStore::open(dir.path().join("breath.db")).unwrap());

    // oldest to newest: deviation 1.00, 2.00, 2.83
    for (i, h, e) in [(5.0, 15.0, 10.0), (2.0, 8.0, 8.0), (5.0, 10.0, 20.0)] {
        record_cycle(&mut journal, i, h, e);
        journal.save_session().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
    }

    let report = journal.process_sessions().unwrap();
    let categories: Vec<Category> = report
        .processed
        .iter()
        .map(|p| p.classification.category)
        .collect();
    assert_eq!(
        categories,
        vec![
            Category::NeedsAttention,
            Category::Borderline,
            Category::Healthy
        ]
    );
    assert_eq!(format!("{:.2}", report.processed[0].classification.deviation), "2.83");
}

#[test]
fn zero_inhale_never_becomes_a_session() {
    let dir = tempdir().unwrap();
    let mut journal = Journal::new(SqliteStore::open(dir.path().join("breath.db")).unwrap());

    record_cycle(&mut journal, 0.0, 16.0, 8.0);

    assert_matches!(journal.save_session(), Err(BreathError::InvalidSession(_)));
    assert!(journal.sessions().unwrap().is_empty());
    assert!(journal.process_sessions().unwrap().processed.is_empty());
}

#[test]
fn unknown_delete_leaves_timings_untouched() {
    let dir = tempdir().unwrap();
    let mut journal = Journal::new(SqliteStore::open(dir.path().join("breath.db")).unwrap());
    record_cycle(&mut journal, 4.0, 16.0, 8.0);
    let before = journal.timings().unwrap();

    assert_matches!(
        journal.delete_timing("12345"),
        Err(BreathError::NotFound { .. })
    );

    let after = journal.timings().unwrap();
    assert_eq!(after.len(), before.len());
    assert_eq!(after, before);
}

#[test]
fn timings_persist_across_reopen_with_exact_durations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("breath.db");
    let duration = 3.141_592_653_589_793;

    {
        let mut journal = Journal::new(SqliteStore::open(&path).unwrap());
        journal.record_timing(PhaseKind::BreathHold, duration).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let listed = store.list_timings().unwrap();
    assert!(listed
        .iter()
        .any(|r| r.kind == PhaseKind::BreathHold && r.duration_seconds == duration));
}

#[test]
fn clear_all_resets_the_database() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("breath.db");
    let mut journal = Journal::new(SqliteStore::open(&path).unwrap());
    record_cycle(&mut journal, 4.0, 16.0, 8.0);
    journal.save_session().unwrap();
    journal
        .set_profile(breathlog::profile::Profile {
            full_name: "Ada".into(),
            ..Default::default()
        })
        .unwrap();

    journal.clear_all().unwrap();
    drop(journal);

    let journal = Journal::new(SqliteStore::open(&path).unwrap());
    let stats = journal.stats().unwrap();
    assert_eq!(stats.total_timings, 0);
    assert_eq!(stats.total_sessions, 0);
    assert_eq!(journal.profile().unwrap(), None);
}

#[test]
fn padded_or_signed_id_does_not_delete_a_timing() {
    let dir = tempdir().unwrap();
    let mut journal = Journal::new(SqliteStore::open(dir.path().join("breath.db")).unwrap());
    let id = journal.record_timing(PhaseKind::Inhalation, 4.0).unwrap();

    for alias in [format!("0{id}"), format!("+{id}")] {
        assert_matches!(
            journal.delete_timing(&alias),
            Err(BreathError::NotFound { .. })
        );
    }
    assert_eq!(journal.timings().unwrap().len(), 1);

    journal.delete_timing(&id).unwrap();
    assert!(journal.timings().unwrap().is_empty());
}

#[test]
fn vanishing_inhale_is_rejected_instead_of_overflowing() {
    let dir = tempdir().unwrap();
    let mut journal = Journal::new(SqliteStore::open(dir.path().join("breath.db")).unwrap());

    record_cycle(&mut journal, 1e-310, 1.0, 1.0);

    assert_matches!(journal.save_session(), Err(BreathError::InvalidSession(_)));
    assert!(journal.sessions().unwrap().is_empty());
}
