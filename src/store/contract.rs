// Behaviour every Store backend must share. Each backend's test module calls
// `run_all` with a factory for fresh, empty stores.

use super::Store;
use crate::classifier::Phases;
use crate::profile::Profile;
use crate::timing::PhaseKind;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn t(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap() + Duration::seconds(secs)
}

pub(crate) fn run_all<S: Store>(fresh: impl Fn() -> S) {
    timings_list_newest_first(fresh());
    equal_timestamps_list_latest_insert_first(fresh());
    duration_round_trips_exactly(fresh());
    delete_removes_only_the_target(fresh());
    delete_unknown_id_leaves_store_unchanged(fresh());
    sessions_list_newest_first(fresh());
    profile_is_single_slot_last_write_wins(fresh());
    clear_all_empties_everything(fresh());
}

fn timings_list_newest_first<S: Store>(mut store: S) {
    store.append_timing(PhaseKind::Inhalation, 4.0, t(0)).unwrap();
    store.append_timing(PhaseKind::Exhalation, 8.0, t(20)).unwrap();
    store.append_timing(PhaseKind::BreathHold, 16.0, t(10)).unwrap();

    let listed = store.list_timings().unwrap();
    let kinds: Vec<PhaseKind> = listed.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PhaseKind::Exhalation,
            PhaseKind::BreathHold,
            PhaseKind::Inhalation
        ]
    );
    assert_eq!(listed[0].recorded_at, t(20));
}

fn equal_timestamps_list_latest_insert_first<S: Store>(mut store: S) {
    let first = store.append_timing(PhaseKind::Inhalation, 1.0, t(5)).unwrap();
    let second = store.append_timing(PhaseKind::Inhalation, 2.0, t(5)).unwrap();

    let ids: Vec<String> = store
        .list_timings()
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![second, first]);
}

fn duration_round_trips_exactly<S: Store>(mut store: S) {
    let awkward = [0.1 + 0.2, 1.0 / 3.0, 123_456.789_012_345, 0.0, 4.0];
    for d in awkward {
        store.append_timing(PhaseKind::BreathHold, d, t(0)).unwrap();
    }
    let stored: Vec<f64> = store
        .list_timings()
        .unwrap()
        .iter()
        .map(|r| r.duration_seconds)
        .collect();
    for d in awkward {
        assert!(stored.contains(&d), "lost precision for {d}");
    }
}

fn delete_removes_only_the_target<S: Store>(mut store: S) {
    let keep = store.append_timing(PhaseKind::Inhalation, 4.0, t(0)).unwrap();
    let gone = store.append_timing(PhaseKind::Exhalation, 8.0, t(1)).unwrap();

    assert!(store.delete_timing(&gone).unwrap());
    let listed = store.list_timings().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep);
}

fn delete_unknown_id_leaves_store_unchanged<S: Store>(mut store: S) {
    let id = store.append_timing(PhaseKind::Inhalation, 4.0, t(0)).unwrap();
    store.append_timing(PhaseKind::Exhalation, 8.0, t(1)).unwrap();
    let before = store.list_timings().unwrap();

    assert!(!store.delete_timing("no-such-id").unwrap());
    assert!(!store.delete_timing("999999").unwrap());
    // look-alikes of an issued id are still unknown
    for alias in [
        format!("0{id}"),
        format!("+{id}"),
        format!("00{id}"),
        format!(" {id}"),
    ] {
        assert!(!store.delete_timing(&alias).unwrap(), "deleted via {alias:?}");
    }

    assert_eq!(store.list_timings().unwrap(), before);
}

fn sessions_list_newest_first<S: Store>(mut store: S) {
    let older = Phases::new(4.0, 16.0, 8.0).unwrap();
    let newer = Phases::new(5.0, 10.0, 20.0).unwrap();
    store
        .append_session(&older, t(0).date_naive(), t(0))
        .unwrap();
    let newest_id = store
        .append_session(&newer, t(60).date_naive(), t(60))
        .unwrap();

    let sessions = store.list_sessions().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, newest_id);
    assert_eq!(sessions[0].inhale_seconds, 5.0);
    assert_eq!(sessions[0].hold_seconds, 10.0);
    assert_eq!(sessions[0].exhale_seconds, 20.0);
    assert_eq!(sessions[0].recorded_date, t(60).date_naive());
    assert_eq!(sessions[1].inhale_seconds, 4.0);
}

fn profile_is_single_slot_last_write_wins<S: Store>(mut store: S) {
    assert_eq!(store.get_profile().unwrap(), None);

    let first = Profile {
        full_name: "Ada".into(),
        notes: "first".into(),
        ..Profile::default()
    };
    let second = Profile {
        full_name: "Grace".into(),
        updated: Some(t(30)),
        ..Profile::default()
    };
    store.set_profile(&first).unwrap();
    store.set_profile(&second).unwrap();

    assert_eq!(store.get_profile().unwrap(), Some(second));
}

fn clear_all_empties_everything<S: Store>(mut store: S) {
    store.append_timing(PhaseKind::Inhalation, 4.0, t(0)).unwrap();
    store
        .append_session(&Phases::new(4.0, 16.0, 8.0).unwrap(), t(0).date_naive(), t(0))
        .unwrap();
    store.set_profile(&Profile::default()).unwrap();

    store.clear_all().unwrap();

    assert!(store.list_timings().unwrap().is_empty());
    assert!(store.list_sessions().unwrap().is_empty());
    assert_eq!(store.get_profile().unwrap(), None);
}
