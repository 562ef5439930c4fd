use super::engine::{AlarmEngine, EngineParts};
use super::scheduler::TriggerPolicy;
use super::store::{AlarmStore, deserialize, serialize};
use super::*;
use crate::common::constants::{ALARMS_KEY, ALARM_NOTIFICATION_TITLE, SETTINGS_KEY};
use crate::io::notify::{MockNotifier, Notifier, Permission};
use crate::io::sound::{MockSound, Sound};
use crate::state::settings::Settings;
use crate::state::{KeyValueStore, MemoryStore, MockKeyValueStore};
use crate::time::convert::{ConversionError, ConvertedTime, convert};
use crate::time::source::{SimulatedTimeSource, TimeSource};
use crate::ui::{AlarmView, ToastKind};
use chrono::{TimeDelta, TimeZone};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
enum ViewEvent {
    List(Vec<AlarmId>),
    Countdown(Option<String>),
    Ringing(AlarmId),
    Hidden,
    Toast(String, ToastKind),
}

#[derive(Default)]
struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    fn record(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    fn last_toast(&self) -> Option<(String, ToastKind)> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::Toast(message, kind) => Some((message, kind)),
            _ => None,
        })
    }
}

impl AlarmView for RecordingView {
    fn render_conversion(&self, _result: &Result<ConvertedTime, ConversionError>) {}

    fn render_alarm_list(&self, alarms: &[Alarm]) {
        self.record(ViewEvent::List(alarms.iter().map(|a| a.id).collect()));
    }

    fn render_countdown(&self, countdown: Option<&str>) {
        self.record(ViewEvent::Countdown(countdown.map(str::to_string)));
    }

    fn show_ringing(&self, alarm: &Alarm) {
        self.record(ViewEvent::Ringing(alarm.id));
    }

    fn hide_ringing(&self) {
        self.record(ViewEvent::Hidden);
    }

    fn show_toast(&self, message: &str, kind: ToastKind) {
        self.record(ViewEvent::Toast(message.to_string(), kind));
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
}

fn silent_sound() -> Arc<dyn Sound> {
    let mut sound = MockSound::new();
    sound.expect_beep().returning(|_| Ok(()));
    Arc::new(sound)
}

fn unused_notifier() -> Arc<dyn Notifier> {
    let mut notifier = MockNotifier::new();
    notifier.expect_notify().never();
    Arc::new(notifier)
}

struct Harness {
    clock: Arc<SimulatedTimeSource>,
    persistence: Arc<MemoryStore>,
    view: Arc<RecordingView>,
}

impl Harness {
    fn new() -> Self {
        Self::with_persistence(MemoryStore::new())
    }

    fn with_persistence(persistence: MemoryStore) -> Self {
        Self {
            clock: Arc::new(SimulatedTimeSource::fast_forward(start())),
            persistence: Arc::new(persistence),
            view: Arc::new(RecordingView::default()),
        }
    }

    fn store(&self) -> AlarmStore {
        AlarmStore::load(
            self.persistence.clone(),
            self.view.clone(),
            self.clock.clone(),
        )
    }

    fn engine_with(
        &self,
        policy: TriggerPolicy,
        notifier: Arc<dyn Notifier>,
        sound: Arc<dyn Sound>,
    ) -> AlarmEngine {
        AlarmEngine::new(EngineParts {
            persistence: self.persistence.clone(),
            view: self.view.clone(),
            notifier,
            sound,
            clock: self.clock.clone(),
            policy,
            beep_duration_ms: 200,
        })
    }

    fn engine(&self) -> AlarmEngine {
        self.engine_with(TriggerPolicy::Strict, unused_notifier(), silent_sound())
    }

    fn advance(&self, delta: TimeDelta) {
        self.clock.advance(delta);
    }

    fn persisted(&self) -> Option<String> {
        self.persistence.get(ALARMS_KEY).unwrap()
    }
}

// # Store

#[test]
fn test_add_rejects_now_and_past() {
    let harness = Harness::new();
    let mut store = harness.store();

    for instant in [start(), start() - TimeDelta::seconds(1), start() - TimeDelta::days(3)] {
        let err = store.add(instant, Tz::UTC).unwrap_err();
        assert_eq!(
            err,
            AlarmError::PastInstant {
                target: instant,
                now: start()
            }
        );
    }
    assert!(store.is_empty());
    assert_eq!(harness.persisted(), None);
}

#[test]
fn test_add_accepts_future_and_writes_through() {
    let harness = Harness::new();
    let mut store = harness.store();

    let alarm = store
        .add(start() + TimeDelta::milliseconds(1), Tz::Europe__Paris)
        .unwrap();
    assert!(alarm.is_active);
    assert_eq!(alarm.zone, Tz::Europe__Paris);
    assert_eq!(store.len(), 1);

    let blob = harness.persisted().unwrap();
    assert!(blob.contains(&alarm.id.to_string()));
    assert_eq!(
        harness.view.events().last(),
        Some(&ViewEvent::List(vec![alarm.id]))
    );
}

#[test]
fn test_ids_are_unique_and_increasing() {
    let harness = Harness::new();
    let mut store = harness.store();

    // Same clock reading for every add
    let ids: Vec<AlarmId> = (1..=3)
        .map(|i| {
            store
                .add(start() + TimeDelta::minutes(i), Tz::UTC)
                .unwrap()
                .id
        })
        .collect();

    assert_eq!(ids[0], AlarmId(start().timestamp_millis() as u64));
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_ids_stay_above_reloaded_high_water_mark() {
    let harness = Harness::new();
    let mut store = harness.store();
    let first = store.add(start() + TimeDelta::hours(1), Tz::UTC).unwrap();

    // Clock moved backwards, as after a restart with a skewed clock
    harness.advance(TimeDelta::minutes(-10));
    let mut reloaded = harness.store();
    let second = reloaded.add(start() + TimeDelta::hours(2), Tz::UTC).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn test_remove_by_id() {
    let harness = Harness::new();
    let mut store = harness.store();
    let keep = store.add(start() + TimeDelta::hours(1), Tz::UTC).unwrap();
    let drop = store.add(start() + TimeDelta::hours(2), Tz::UTC).unwrap();

    assert!(store.remove_by_id(drop.id));
    assert!(!store.remove_by_id(AlarmId(42)));
    assert_eq!(store.alarms().len(), 1);
    assert_eq!(store.alarms()[0].id, keep.id);

    store.clear_all();
    assert!(store.is_empty());
    assert_eq!(harness.persisted().as_deref(), Some("[]"));
}

#[test]
fn test_next_due_is_strictly_after_now_with_id_tie_break() {
    let harness = Harness::new();
    let mut store = harness.store();
    let target = start() + TimeDelta::minutes(10);
    let first = store.add(target, Tz::UTC).unwrap();
    let _second = store.add(target, Tz::Asia__Tokyo).unwrap();
    let later = store.add(target + TimeDelta::seconds(1), Tz::UTC).unwrap();

    assert_eq!(store.next_due(start()).map(|a| a.id), Some(first.id));
    // An alarm exactly at now is no longer "next"
    assert_eq!(store.next_due(target).map(|a| a.id), Some(later.id));
    assert!(store.next_due(target + TimeDelta::seconds(1)).is_none());
}

#[test]
fn test_prune_removes_exactly_alarms_past_grace_window() {
    let harness = Harness::new();
    let mut store = harness.store();
    let a = store.add(start() + TimeDelta::minutes(1), Tz::UTC).unwrap();
    let b = store.add(start() + TimeDelta::minutes(2), Tz::UTC).unwrap();

    let events_before = harness.view.events().len();
    // a is exactly at the edge of the window and survives
    let now = start() + TimeDelta::minutes(6);
    assert_eq!(store.prune(now), 0);
    assert_eq!(harness.view.events().len(), events_before);

    let now = now + TimeDelta::milliseconds(1);
    assert_eq!(store.prune(now), 1);
    assert!(store.get(a.id).is_none());
    assert!(store.get(b.id).is_some());
    assert_eq!(harness.view.events().last(), Some(&ViewEvent::List(vec![b.id])));
}

// # Persistence format

#[test]
fn test_serialize_format() {
    let alarm = Alarm {
        id: AlarmId(1736951400000),
        target: Utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 0).unwrap(),
        zone: Tz::America__New_York,
        is_active: true,
    };

    let blob = serialize(std::slice::from_ref(&alarm));
    let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "id": 1736951400000u64,
            "originalInstant": "2025-01-15T09:30:00.000-05:00",
            "zoneId": "America/New_York",
            "isActive": true
        }])
    );
}

#[test]
fn test_deserialize_keeps_target_and_zone() {
    let alarms = vec![
        Alarm {
            id: AlarmId(1),
            target: start() + TimeDelta::milliseconds(1500),
            zone: Tz::Asia__Kolkata,
            is_active: true,
        },
        Alarm {
            id: AlarmId(2),
            target: start() + TimeDelta::days(40),
            zone: Tz::Australia__Sydney,
            is_active: false,
        },
    ];

    let restored = deserialize(&serialize(&alarms), start()).unwrap();
    assert_eq!(restored, alarms);
}

#[test]
fn test_deserialize_drops_past_and_skips_bad_entries() {
    let blob = r#"[
        {"id": 1, "originalInstant": "2025-01-15T11:00:00.000+00:00", "zoneId": "UTC", "isActive": true},
        {"id": 2, "originalInstant": "2025-01-15T12:00:00.000+00:00", "zoneId": "UTC", "isActive": true},
        {"id": 3, "originalInstant": "yesterday", "zoneId": "UTC", "isActive": true},
        {"id": 4, "originalInstant": "2025-01-15T13:00:00.000+00:00", "zoneId": "Nowhere/Land", "isActive": true},
        {"unexpected": true},
        {"id": 5, "originalTime": "2025-01-15T08:00:00.000-05:00", "timezone": "America/New_York", "isActive": true}
    ]"#;

    let alarms = deserialize(blob, start()).unwrap();
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0].id, AlarmId(5));
    assert_eq!(
        alarms[0].target,
        Utc.with_ymd_and_hms(2025, 1, 15, 13, 0, 0).unwrap()
    );
}

#[test]
fn test_deserialize_corrupt_blob_is_error() {
    assert!(matches!(
        deserialize("{not json", start()),
        Err(PersistenceError::Corrupt(_))
    ));
    assert!(matches!(
        deserialize(r#"{"id": 1}"#, start()),
        Err(PersistenceError::Corrupt(_))
    ));
}

#[test]
fn test_load_only_future_alarm() {
    let blob = serialize(&[
        Alarm {
            id: AlarmId(10),
            target: start() - TimeDelta::minutes(1),
            zone: Tz::UTC,
            is_active: true,
        },
        Alarm {
            id: AlarmId(11),
            target: start() + TimeDelta::minutes(1),
            zone: Tz::UTC,
            is_active: true,
        },
    ]);
    let harness = Harness::with_persistence(MemoryStore::new().with_entry(ALARMS_KEY, &blob));

    let store = harness.store();
    assert_eq!(store.alarms().len(), 1);
    assert_eq!(store.alarms()[0].id, AlarmId(11));
}

#[test]
fn test_load_recovers_from_corrupt_and_unreadable_storage() {
    let harness = Harness::with_persistence(MemoryStore::new().with_entry(ALARMS_KEY, "garbage"));
    assert!(harness.store().is_empty());

    let mut failing = MockKeyValueStore::new();
    failing
        .expect_get()
        .returning(|_| Err(anyhow::anyhow!("permission denied")));
    let store = AlarmStore::load(
        Arc::new(failing),
        Arc::new(RecordingView::default()),
        Arc::new(SimulatedTimeSource::fast_forward(start())),
    );
    assert!(store.is_empty());
}

#[test]
fn test_write_failure_keeps_alarm_in_memory() {
    let mut failing = MockKeyValueStore::new();
    failing.expect_get().returning(|_| Ok(None));
    failing
        .expect_set()
        .returning(|_, _| Err(anyhow::anyhow!("disk full")));

    let mut store = AlarmStore::load(
        Arc::new(failing),
        Arc::new(RecordingView::default()),
        Arc::new(SimulatedTimeSource::fast_forward(start())),
    );
    assert!(store.add(start() + TimeDelta::hours(1), Tz::UTC).is_ok());
    assert_eq!(store.len(), 1);
}

// # Scheduler and lifecycle

#[test]
fn test_alarm_two_seconds_out_triggers_exactly_once() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    let alarm = engine
        .add_alarm(start() + TimeDelta::seconds(2), Tz::UTC)
        .unwrap();

    harness.advance(TimeDelta::seconds(1));
    let report = engine.tick();
    assert!(report.triggered.is_empty());
    assert_eq!(report.countdown.as_deref(), Some("0h 0m 1s"));
    assert!(engine.ringing().is_none());

    let mut triggered = Vec::new();
    for _ in 0..2 {
        harness.advance(TimeDelta::seconds(1));
        triggered.extend(engine.tick().triggered);
    }

    assert_eq!(triggered, vec![alarm.id]);
    assert!(!engine.store().get(alarm.id).unwrap().is_active);
    assert_eq!(engine.ringing().map(|a| a.id), Some(alarm.id));
    assert!(harness.view.events().contains(&ViewEvent::Ringing(alarm.id)));

    // The deactivation reached persistence
    let persisted = harness.persisted().unwrap();
    assert!(persisted.contains("\"isActive\":false"));
}

#[test]
fn test_countdown_cleared_when_nothing_pending() {
    let harness = Harness::new();
    let mut engine = harness.engine();

    let report = engine.tick();
    assert_eq!(report.countdown, None);
    assert_eq!(
        harness.view.events().last(),
        Some(&ViewEvent::Countdown(None))
    );
}

#[test]
fn test_trigger_then_snooze() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    let target = start() + TimeDelta::seconds(30);
    let original = engine.add_alarm(target, Tz::Europe__Berlin).unwrap();

    harness.advance(TimeDelta::seconds(30));
    engine.tick();
    assert!(engine.ringing().is_some());

    let snoozed = engine.snooze().unwrap();
    assert!(engine.ringing().is_none());
    assert!(snoozed.is_active);
    assert_eq!(snoozed.target, target + TimeDelta::minutes(5));
    assert_eq!(snoozed.zone, Tz::Europe__Berlin);
    assert!(!engine.store().get(original.id).unwrap().is_active);
    assert_eq!(engine.store().len(), 2);
    assert!(harness.view.events().contains(&ViewEvent::Hidden));
}

#[test]
fn test_dismiss_then_prune_moves_next_due() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    let one_hour = engine
        .add_alarm(start() + TimeDelta::hours(1), Tz::UTC)
        .unwrap();
    let two_hours = engine
        .add_alarm(start() + TimeDelta::hours(2), Tz::UTC)
        .unwrap();

    assert_eq!(
        engine.store().next_due(start()).map(|a| a.id),
        Some(one_hour.id)
    );

    harness.advance(TimeDelta::hours(1));
    assert_eq!(engine.tick().triggered, vec![one_hour.id]);
    assert_eq!(engine.dismiss().map(|a| a.id), Some(one_hour.id));
    assert!(engine.store().get(one_hour.id).is_some());

    harness.advance(TimeDelta::minutes(5) + TimeDelta::seconds(1));
    let report = engine.tick();
    assert_eq!(report.pruned, 1);
    assert!(engine.store().get(one_hour.id).is_none());
    assert_eq!(
        engine.store().next_due(engine.now()).map(|a| a.id),
        Some(two_hours.id)
    );
}

#[test]
fn test_strict_policy_skips_missed_tick() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    let alarm = engine
        .add_alarm(start() + TimeDelta::seconds(5), Tz::UTC)
        .unwrap();

    // The process was suspended across the target
    harness.advance(TimeDelta::seconds(8));
    assert!(engine.tick().triggered.is_empty());
    assert!(engine.store().get(alarm.id).unwrap().is_active);
    assert!(engine.ringing().is_none());
}

#[test]
fn test_catch_up_policy_fires_late_tick() {
    let harness = Harness::new();
    let mut engine =
        harness.engine_with(TriggerPolicy::CatchUp, unused_notifier(), silent_sound());
    let alarm = engine
        .add_alarm(start() + TimeDelta::seconds(5), Tz::UTC)
        .unwrap();

    harness.advance(TimeDelta::minutes(2));
    assert_eq!(engine.tick().triggered, vec![alarm.id]);

    harness.advance(TimeDelta::seconds(1));
    assert!(engine.tick().triggered.is_empty());
}

#[test]
fn test_dismiss_and_snooze_without_ringing_are_noops() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    engine
        .add_alarm(start() + TimeDelta::hours(1), Tz::UTC)
        .unwrap();
    let events = harness.view.events().len();

    assert!(engine.dismiss().is_none());
    assert!(engine.snooze().is_none());
    assert_eq!(engine.store().len(), 1);
    assert_eq!(harness.view.events().len(), events);
}

#[test]
fn test_second_trigger_replaces_ringing_alarm() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    let target = start() + TimeDelta::seconds(10);
    let first = engine.add_alarm(target, Tz::UTC).unwrap();
    let second = engine.add_alarm(target, Tz::UTC).unwrap();

    harness.advance(TimeDelta::seconds(10));
    let report = engine.tick();
    assert_eq!(report.triggered, vec![first.id, second.id]);
    assert_eq!(engine.ringing().map(|a| a.id), Some(second.id));
}

#[test]
fn test_removing_ringing_alarm_dismisses_it() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    let alarm = engine
        .add_alarm(start() + TimeDelta::seconds(1), Tz::UTC)
        .unwrap();

    harness.advance(TimeDelta::seconds(1));
    engine.tick();
    assert!(engine.ringing().is_some());

    assert!(engine.remove(alarm.id));
    assert!(engine.ringing().is_none());
    assert!(harness.view.events().contains(&ViewEvent::Hidden));
}

#[test]
fn test_clear_all_dismisses_ringing_alarm() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    engine
        .add_alarm(start() + TimeDelta::seconds(1), Tz::UTC)
        .unwrap();
    engine
        .add_alarm(start() + TimeDelta::hours(1), Tz::UTC)
        .unwrap();

    harness.advance(TimeDelta::seconds(1));
    engine.tick();
    engine.clear_all();

    assert!(engine.ringing().is_none());
    assert!(engine.store().is_empty());
    assert_eq!(harness.persisted().as_deref(), Some("[]"));
}

#[test]
fn test_snooze_into_past_reports_error() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    engine
        .add_alarm(start() + TimeDelta::seconds(1), Tz::UTC)
        .unwrap();

    harness.advance(TimeDelta::seconds(1));
    engine.tick();

    // Left ringing well past the snooze offset
    harness.advance(TimeDelta::minutes(6));
    assert!(engine.snooze().is_none());
    assert!(engine.ringing().is_none());
    let (message, kind) = harness.view.last_toast().unwrap();
    assert_eq!(kind, ToastKind::Error);
    assert!(message.contains("future"));
}

#[test]
fn test_set_alarm_from_conversion() {
    let harness = Harness::new();
    let mut engine = harness.engine();

    let converted = convert("2025-01-15", "09:30", "America/New_York", "Asia/Tokyo").unwrap();
    let alarm = engine.set_alarm(&converted).unwrap();
    assert_eq!(
        alarm.target,
        Utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 0).unwrap()
    );
    assert_eq!(alarm.zone, Tz::Asia__Tokyo);
    assert_eq!(alarm.clock(), "23:30:00");

    let past = convert("2025-01-15", "06:00", "America/New_York", "UTC").unwrap();
    assert!(engine.set_alarm(&past).is_err());
    assert_eq!(harness.view.last_toast().unwrap().1, ToastKind::Error);
}

#[test]
fn test_reload_picks_up_external_changes() {
    let harness = Harness::new();
    let mut engine = harness.engine();

    // Another process writes alarms and settings
    let mut other = harness.store();
    let external = other.add(start() + TimeDelta::hours(3), Tz::UTC).unwrap();
    harness
        .persistence
        .set(SETTINGS_KEY, r#"{"sound":false}"#)
        .unwrap();

    engine.reload();
    assert!(engine.store().get(external.id).is_some());
    assert!(!engine.settings().sound);
}

#[test]
fn test_reload_keeps_alarm_inside_trigger_window() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    let due = engine
        .add_alarm(start() + TimeDelta::seconds(10), Tz::UTC)
        .unwrap();
    engine.tick();

    // The target passed but no tick has sampled it yet
    harness.advance(TimeDelta::milliseconds(10_300));
    let mut other = AlarmStore::open(
        harness.persistence.clone(),
        harness.view.clone(),
        harness.clock.clone(),
    );
    assert!(other.get(due.id).is_some());
    other.add(start() + TimeDelta::hours(1), Tz::UTC).unwrap();

    engine.reload();
    assert!(engine.store().get(due.id).is_some());
    assert_eq!(engine.tick().triggered, vec![due.id]);
}

#[test]
fn test_reload_keeps_ringing_alarm_in_store() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    let alarm = engine
        .add_alarm(start() + TimeDelta::seconds(2), Tz::UTC)
        .unwrap();
    harness.advance(TimeDelta::seconds(2));
    engine.tick();
    assert_eq!(engine.ringing().map(|a| a.id), Some(alarm.id));

    harness.advance(TimeDelta::seconds(30));
    let mut other = AlarmStore::open(
        harness.persistence.clone(),
        harness.view.clone(),
        harness.clock.clone(),
    );
    other.add(start() + TimeDelta::hours(1), Tz::UTC).unwrap();

    engine.reload();
    assert_eq!(engine.ringing().map(|a| a.id), Some(alarm.id));
    let kept = engine.store().get(alarm.id).unwrap();
    assert!(!kept.is_active);
    assert_eq!(engine.store().len(), 2);

    // Gone once it leaves the grace window
    harness.advance(TimeDelta::minutes(6));
    engine.reload();
    assert!(engine.store().get(alarm.id).is_none());
}

#[test]
fn test_reload_does_not_reactivate_fired_alarm() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    let alarm = engine
        .add_alarm(start() + TimeDelta::seconds(1), Tz::UTC)
        .unwrap();

    // Another process read the alarm while it was still active
    let stale = serialize(engine.store().alarms());
    harness.advance(TimeDelta::seconds(1));
    engine.tick();
    harness.persistence.set(ALARMS_KEY, &stale).unwrap();

    engine.reload();
    assert!(!engine.store().get(alarm.id).unwrap().is_active);
    assert!(engine.tick().triggered.is_empty());
}

#[test]
fn test_startup_load_still_drops_past_alarms() {
    let harness = Harness::new();
    let mut store = harness.store();
    let alarm = store.add(start() + TimeDelta::seconds(5), Tz::UTC).unwrap();
    harness.advance(TimeDelta::seconds(6));

    assert!(harness.store().get(alarm.id).is_none());
    let opened = AlarmStore::open(
        harness.persistence.clone(),
        harness.view.clone(),
        harness.clock.clone(),
    );
    assert!(opened.get(alarm.id).is_some());
}

#[test]
fn test_sound_loop_stops_on_dismiss_and_snooze() {
    let harness = Harness::new();
    let mut engine = harness.engine();
    engine
        .add_alarm(start() + TimeDelta::seconds(1), Tz::UTC)
        .unwrap();
    harness.advance(TimeDelta::seconds(1));
    engine.tick();
    assert!(engine.is_sounding());
    engine.dismiss();
    assert!(!engine.is_sounding());

    engine
        .add_alarm(start() + TimeDelta::seconds(3), Tz::UTC)
        .unwrap();
    harness.advance(TimeDelta::seconds(2));
    engine.tick();
    assert!(engine.is_sounding());
    engine.snooze();
    assert!(!engine.is_sounding());
}

// # Side effects

#[test]
fn test_trigger_notifies_when_enabled_and_granted() {
    let harness = Harness::with_persistence(
        MemoryStore::new().with_entry(SETTINGS_KEY, r#"{"notifications":true,"sound":true}"#),
    );
    let mut notifier = MockNotifier::new();
    notifier
        .expect_request_permission()
        .times(1)
        .returning(|| Permission::Granted);
    notifier
        .expect_notify()
        .withf(|title, body| title == ALARM_NOTIFICATION_TITLE && body.contains("12:00"))
        .times(2)
        .returning(|_, _| Ok(()));
    let mut sound = MockSound::new();
    sound.expect_beep().withf(|ms| *ms == 200).returning(|_| Ok(()));

    let mut engine =
        harness.engine_with(TriggerPolicy::Strict, Arc::new(notifier), Arc::new(sound));
    engine.add_alarm(start() + TimeDelta::seconds(1), Tz::UTC).unwrap();
    engine.add_alarm(start() + TimeDelta::seconds(2), Tz::UTC).unwrap();

    harness.advance(TimeDelta::seconds(1));
    engine.tick();
    harness.advance(TimeDelta::seconds(1));
    engine.tick();
    engine.dismiss();
}

#[test]
fn test_trigger_skips_notification_when_denied() {
    let harness = Harness::with_persistence(
        MemoryStore::new().with_entry(SETTINGS_KEY, r#"{"notifications":true}"#),
    );
    let mut notifier = MockNotifier::new();
    notifier
        .expect_request_permission()
        .returning(|| Permission::Denied);
    notifier.expect_notify().never();

    let mut engine =
        harness.engine_with(TriggerPolicy::Strict, Arc::new(notifier), silent_sound());
    engine.add_alarm(start() + TimeDelta::seconds(1), Tz::UTC).unwrap();
    harness.advance(TimeDelta::seconds(1));
    assert_eq!(engine.tick().triggered.len(), 1);
}

#[test]
fn test_trigger_is_silent_when_sound_disabled() {
    let harness = Harness::new();
    let mut sound = MockSound::new();
    sound.expect_beep().never();

    let mut engine =
        harness.engine_with(TriggerPolicy::Strict, unused_notifier(), Arc::new(sound));
    engine.set_settings(Settings {
        notifications: false,
        sound: false,
    });
    engine.add_alarm(start() + TimeDelta::seconds(1), Tz::UTC).unwrap();
    harness.advance(TimeDelta::seconds(1));
    engine.tick();
    assert!(engine.ringing().is_some());

    // The new settings were persisted
    assert!(!Settings::load(harness.persistence.as_ref()).sound);
}

#[test]
fn test_test_alarm_plays_and_notifies() {
    let harness = Harness::with_persistence(
        MemoryStore::new().with_entry(SETTINGS_KEY, r#"{"notifications":true}"#),
    );
    let mut notifier = MockNotifier::new();
    notifier
        .expect_request_permission()
        .returning(|| Permission::Granted);
    notifier
        .expect_notify()
        .withf(|title, _| title.contains("Test"))
        .times(1)
        .returning(|_, _| Ok(()));
    let mut sound = MockSound::new();
    sound.expect_beep().times(1..).returning(|_| Ok(()));

    let mut engine =
        harness.engine_with(TriggerPolicy::Strict, Arc::new(notifier), Arc::new(sound));
    engine.test_alarm(std::time::Duration::from_millis(20));
    assert!(engine.ringing().is_none());
}
