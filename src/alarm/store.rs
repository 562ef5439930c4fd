//! The ordered alarm collection and its persistence.
//!
//! Every mutation is written through to the [`KeyValueStore`] as one JSON
//! array and followed by a `render_alarm_list` call on the view, so the
//! stored blob and what the user sees never lag behind the collection.
//! Write failures are logged and otherwise ignored.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Alarm, AlarmError, AlarmId, PersistenceError};
use crate::common::constants::{ALARMS_KEY, GRACE_WINDOW_MINUTES};
use crate::state::KeyValueStore;
use crate::time::source::TimeSource;
use crate::time::zones::parse_zone;
use crate::ui::AlarmView;

/// On-disk shape of one alarm.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAlarm {
    id: u64,
    /// RFC 3339 instant carrying the zone's offset.
    #[serde(alias = "originalTime")]
    original_instant: String,
    #[serde(alias = "timezone")]
    zone_id: String,
    #[serde(default = "active_by_default")]
    is_active: bool,
}

fn active_by_default() -> bool {
    true
}

impl From<&Alarm> for StoredAlarm {
    fn from(alarm: &Alarm) -> Self {
        Self {
            id: alarm.id.0,
            original_instant: alarm
                .local_target()
                .to_rfc3339_opts(SecondsFormat::Millis, false),
            zone_id: alarm.zone.name().to_string(),
            is_active: alarm.is_active,
        }
    }
}

impl StoredAlarm {
    fn into_alarm(self) -> Result<Alarm, String> {
        let target = DateTime::parse_from_rfc3339(&self.original_instant)
            .map_err(|e| format!("alarm {}: bad instant '{}': {e}", self.id, self.original_instant))?
            .with_timezone(&Utc);
        let zone: Tz = parse_zone(&self.zone_id)
            .ok_or_else(|| format!("alarm {}: unknown zone '{}'", self.id, self.zone_id))?;
        Ok(Alarm {
            id: AlarmId(self.id),
            target,
            zone,
            is_active: self.is_active,
        })
    }
}

/// Encode alarms as the persisted JSON array.
pub fn serialize(alarms: &[Alarm]) -> String {
    let stored: Vec<StoredAlarm> = alarms.iter().map(StoredAlarm::from).collect();
    // A Vec of plain structs always encodes
    serde_json::to_string(&stored).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a persisted JSON array, keeping only alarms still in the future.
///
/// Individual entries that cannot be understood are skipped with a warning;
/// a blob that is not a JSON array at all is an error.
pub fn deserialize(text: &str, now: DateTime<Utc>) -> Result<Vec<Alarm>, PersistenceError> {
    let mut alarms = decode(text)?;
    alarms.retain(|alarm| alarm.target > now);
    Ok(alarms)
}

/// Decode a persisted JSON array, past alarms included.
pub fn decode(text: &str) -> Result<Vec<Alarm>, PersistenceError> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(text).map_err(|e| PersistenceError::Corrupt(e.to_string()))?;

    let mut alarms = Vec::with_capacity(entries.len());
    for entry in entries {
        let alarm = serde_json::from_value::<StoredAlarm>(entry)
            .map_err(|e| format!("malformed entry: {e}"))
            .and_then(StoredAlarm::into_alarm);
        match alarm {
            Ok(alarm) => alarms.push(alarm),
            Err(reason) => log_warning!("Skipping stored alarm, {reason}"),
        }
    }
    Ok(alarms)
}

fn grace_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - TimeDelta::minutes(GRACE_WINDOW_MINUTES)
}

/// All scheduled alarms, in insertion order.
pub struct AlarmStore {
    alarms: Vec<Alarm>,
    // Highest id handed out so far
    last_id: u64,
    persistence: Arc<dyn KeyValueStore>,
    view: Arc<dyn AlarmView>,
    clock: Arc<dyn TimeSource>,
}

impl AlarmStore {
    /// An empty store; nothing is read from persistence.
    pub fn new(
        persistence: Arc<dyn KeyValueStore>,
        view: Arc<dyn AlarmView>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            alarms: Vec::new(),
            last_id: 0,
            persistence,
            view,
            clock,
        }
    }

    /// A store populated from persistence at daemon startup.
    ///
    /// Only alarms still in the future are kept. An unreadable or corrupt
    /// blob is logged and the store starts empty.
    pub fn load(
        persistence: Arc<dyn KeyValueStore>,
        view: Arc<dyn AlarmView>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let mut store = Self::new(persistence, view, clock);
        let now = store.clock.now();
        store.restore(|alarm| alarm.target > now);
        store
    }

    /// A store populated from persistence while a daemon may be running.
    ///
    /// Alarms that already passed are kept until they leave the grace
    /// window, so one due or ringing in the daemon survives a rewrite.
    pub fn open(
        persistence: Arc<dyn KeyValueStore>,
        view: Arc<dyn AlarmView>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let mut store = Self::new(persistence, view, clock);
        let cutoff = grace_cutoff(store.clock.now());
        store.restore(|alarm| alarm.target >= cutoff);
        store
    }

    fn read_persisted(&self) -> Result<Vec<Alarm>, PersistenceError> {
        let blob = self
            .persistence
            .get(ALARMS_KEY)
            .map_err(|e| PersistenceError::Unreadable(e.to_string()))?;
        match blob {
            Some(text) => decode(&text),
            None => Ok(Vec::new()),
        }
    }

    fn restore(&mut self, keep: impl Fn(&Alarm) -> bool) {
        self.alarms = match self.read_persisted() {
            Ok(alarms) => alarms.into_iter().filter(|alarm| keep(alarm)).collect(),
            Err(e) => {
                log_warning!("{e}; starting with no alarms");
                Vec::new()
            }
        };
        let highest = self.alarms.iter().map(|a| a.id.0).max().unwrap_or(0);
        self.last_id = self.last_id.max(highest);
    }

    /// Re-read persisted alarms after another process changed them.
    ///
    /// Uses the grace window like [`AlarmStore::open`]. Alarms fired here
    /// stay inactive even if the other process wrote them back as active.
    pub fn reload(&mut self) {
        let fired: Vec<AlarmId> = self
            .alarms
            .iter()
            .filter(|alarm| !alarm.is_active)
            .map(|alarm| alarm.id)
            .collect();
        let cutoff = grace_cutoff(self.clock.now());
        self.restore(|alarm| alarm.target >= cutoff);
        for alarm in &mut self.alarms {
            if fired.contains(&alarm.id) {
                alarm.is_active = false;
            }
        }
        self.view.render_alarm_list(&self.alarms);
    }

    fn next_id(&mut self) -> AlarmId {
        let millis = self.clock.now().timestamp_millis().max(0) as u64;
        self.last_id = millis.max(self.last_id + 1);
        AlarmId(self.last_id)
    }

    fn commit(&self) {
        if let Err(e) = self.persistence.set(ALARMS_KEY, &self.serialize()) {
            log_warning!("Failed to save alarms: {e}");
        }
        self.view.render_alarm_list(&self.alarms);
    }

    /// Schedule a new active alarm at `instant`, displayed in `zone`.
    pub fn add(&mut self, instant: DateTime<Utc>, zone: Tz) -> Result<Alarm, AlarmError> {
        let now = self.clock.now();
        if instant <= now {
            return Err(AlarmError::PastInstant {
                target: instant,
                now,
            });
        }

        let alarm = Alarm {
            id: self.next_id(),
            target: instant,
            zone,
            is_active: true,
        };
        self.alarms.push(alarm.clone());
        self.commit();
        Ok(alarm)
    }

    /// Remove the alarm with `id`; returns whether one was removed.
    pub fn remove_by_id(&mut self, id: AlarmId) -> bool {
        let before = self.alarms.len();
        self.alarms.retain(|alarm| alarm.id != id);
        let removed = self.alarms.len() != before;
        self.commit();
        removed
    }

    pub fn clear_all(&mut self) {
        self.alarms.clear();
        self.commit();
    }

    /// Mark an alarm as fired and return it.
    pub fn deactivate(&mut self, id: AlarmId) -> Option<Alarm> {
        let alarm = self.alarms.iter_mut().find(|alarm| alarm.id == id)?;
        alarm.is_active = false;
        let fired = alarm.clone();
        self.commit();
        Some(fired)
    }

    /// The alarm with the earliest target strictly after `now`.
    ///
    /// Equal targets resolve to the lowest id.
    pub fn next_due(&self, now: DateTime<Utc>) -> Option<&Alarm> {
        self.alarms
            .iter()
            .filter(|alarm| alarm.target > now)
            .min_by_key(|alarm| (alarm.target, alarm.id))
    }

    /// Drop alarms whose target lies beyond the grace window before `now`.
    ///
    /// Persists and re-renders only when something was removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = grace_cutoff(now);
        let before = self.alarms.len();
        self.alarms.retain(|alarm| alarm.target >= cutoff);
        let removed = before - self.alarms.len();
        if removed > 0 {
            self.commit();
        }
        removed
    }

    pub fn serialize(&self) -> String {
        serialize(&self.alarms)
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|alarm| alarm.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }
}
