//! One owned engine: store, scheduler and lifecycle controller together.
//!
//! The daemon loop holds the only `AlarmEngine` and calls into it from the
//! tick and from user messages, so every mutation happens on one thread.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

use super::lifecycle::LifecycleController;
use super::scheduler::{Scheduler, TickReport, TriggerPolicy};
use super::store::AlarmStore;
use super::{Alarm, AlarmError, AlarmId};
use crate::io::notify::Notifier;
use crate::io::sound::Sound;
use crate::state::KeyValueStore;
use crate::state::settings::Settings;
use crate::time::convert::ConvertedTime;
use crate::time::source::TimeSource;
use crate::ui::{AlarmView, ToastKind};

/// Collaborators and options an engine is built from.
pub struct EngineParts {
    pub persistence: Arc<dyn KeyValueStore>,
    pub view: Arc<dyn AlarmView>,
    pub notifier: Arc<dyn Notifier>,
    pub sound: Arc<dyn Sound>,
    pub clock: Arc<dyn TimeSource>,
    pub policy: TriggerPolicy,
    pub beep_duration_ms: u64,
}

pub struct AlarmEngine {
    store: AlarmStore,
    scheduler: Scheduler,
    controller: LifecycleController,
    persistence: Arc<dyn KeyValueStore>,
    view: Arc<dyn AlarmView>,
    clock: Arc<dyn TimeSource>,
}

impl AlarmEngine {
    /// Build an engine, loading alarms and settings from persistence.
    pub fn new(parts: EngineParts) -> Self {
        let settings = Settings::load(parts.persistence.as_ref());
        let store = AlarmStore::load(
            parts.persistence.clone(),
            parts.view.clone(),
            parts.clock.clone(),
        );
        let controller = LifecycleController::new(
            parts.view.clone(),
            parts.notifier,
            parts.sound,
            settings,
            parts.beep_duration_ms,
        );

        Self {
            store,
            scheduler: Scheduler::new(parts.policy),
            controller,
            persistence: parts.persistence,
            view: parts.view,
            clock: parts.clock,
        }
    }

    pub fn store(&self) -> &AlarmStore {
        &self.store
    }

    pub fn ringing(&self) -> Option<&Alarm> {
        self.controller.ringing()
    }

    /// Whether the alarm sound loop is running.
    pub fn is_sounding(&self) -> bool {
        self.controller.is_sounding()
    }

    pub fn settings(&self) -> Settings {
        self.controller.settings()
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.scheduler.policy()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Schedule an alarm at a converted instant, shown in its destination zone.
    pub fn set_alarm(&mut self, converted: &ConvertedTime) -> Result<Alarm, AlarmError> {
        self.add_alarm(converted.instant(), converted.destination_zone())
    }

    pub fn add_alarm(&mut self, instant: DateTime<Utc>, zone: Tz) -> Result<Alarm, AlarmError> {
        match self.store.add(instant, zone) {
            Ok(alarm) => {
                self.view.show_toast(
                    &format!("Alarm set for {} {}", alarm.clock(), alarm.date_label()),
                    ToastKind::Success,
                );
                Ok(alarm)
            }
            Err(e) => {
                self.view.show_toast(&e.to_string(), ToastKind::Error);
                Err(e)
            }
        }
    }

    /// Remove one alarm, dismissing it first if it is ringing.
    pub fn remove(&mut self, id: AlarmId) -> bool {
        self.controller.forget(id);
        let removed = self.store.remove_by_id(id);
        if removed {
            self.view.show_toast("Alarm removed", ToastKind::Info);
        }
        removed
    }

    /// Remove every alarm, dismissing a ringing one.
    pub fn clear_all(&mut self) {
        self.controller.dismiss();
        self.store.clear_all();
        self.view.show_toast("All alarms cleared", ToastKind::Info);
    }

    /// Run one scheduler tick at the clock's current time.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        self.scheduler
            .tick(now, &mut self.store, &mut self.controller)
    }

    pub fn dismiss(&mut self) -> Option<Alarm> {
        self.controller.dismiss()
    }

    /// Snooze the ringing alarm. A failure is reported as an error toast.
    pub fn snooze(&mut self) -> Option<Alarm> {
        match self.controller.snooze(&mut self.store) {
            Ok(Some(alarm)) => {
                self.view.show_toast(
                    &format!("Alarm snoozed until {}", alarm.clock()),
                    ToastKind::Success,
                );
                Some(alarm)
            }
            Ok(None) => None,
            Err(e) => {
                self.view
                    .show_toast(&format!("Snooze failed: {e}"), ToastKind::Error);
                None
            }
        }
    }

    /// Pick up alarms and settings changed by another process.
    ///
    /// A ringing alarm keeps ringing even if the reloaded store no longer
    /// holds it.
    pub fn reload(&mut self) {
        self.store.reload();
        self.controller
            .set_settings(Settings::load(self.persistence.as_ref()));
    }

    /// Replace and persist the settings.
    pub fn set_settings(&mut self, settings: Settings) {
        settings.save(self.persistence.as_ref());
        self.controller.set_settings(settings);
    }

    pub fn test_alarm(&mut self, duration: std::time::Duration) {
        self.controller.test_alarm(duration);
    }
}
