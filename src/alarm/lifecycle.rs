//! Ringing state machine: `Pending → Ringing → Dismissed | Snoozed`.
//!
//! At most one alarm rings at a time. Triggering while another alarm rings
//! replaces it; the replaced alarm is already inactive and is left for the
//! prune to collect.

use chrono::TimeDelta;
use std::sync::Arc;
use std::time::Duration;

use super::store::AlarmStore;
use super::{Alarm, AlarmError, AlarmId};
use crate::common::constants::{
    ALARM_NOTIFICATION_TITLE, SNOOZE_MINUTES, TEST_NOTIFICATION_TITLE,
};
use crate::io::notify::{Notifier, Permission};
use crate::io::sound::{Sound, SoundLoop};
use crate::state::settings::Settings;
use crate::ui::AlarmView;

pub struct LifecycleController {
    ringing: Option<Alarm>,
    settings: Settings,
    // Asked on first use, then cached
    permission: Option<Permission>,
    view: Arc<dyn AlarmView>,
    notifier: Arc<dyn Notifier>,
    sound: Arc<dyn Sound>,
    beep_duration_ms: u64,
    sound_loop: Option<SoundLoop>,
}

impl LifecycleController {
    pub fn new(
        view: Arc<dyn AlarmView>,
        notifier: Arc<dyn Notifier>,
        sound: Arc<dyn Sound>,
        settings: Settings,
        beep_duration_ms: u64,
    ) -> Self {
        Self {
            ringing: None,
            settings,
            permission: None,
            view,
            notifier,
            sound,
            beep_duration_ms,
            sound_loop: None,
        }
    }

    pub fn view(&self) -> &dyn AlarmView {
        self.view.as_ref()
    }

    /// The alarm currently ringing, if any.
    pub fn ringing(&self) -> Option<&Alarm> {
        self.ringing.as_ref()
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        if settings.notifications && !self.settings.notifications {
            self.permission = None;
        }
        self.settings = settings;
    }

    pub fn is_sounding(&self) -> bool {
        self.sound_loop.as_ref().is_some_and(SoundLoop::is_running)
    }

    fn notifications_allowed(&mut self) -> bool {
        if !self.settings.notifications {
            return false;
        }
        let permission = *self
            .permission
            .get_or_insert_with(|| self.notifier.request_permission());
        permission == Permission::Granted
    }

    fn send_notification(&mut self, title: &str, body: &str) {
        if !self.notifications_allowed() {
            return;
        }
        if let Err(e) = self.notifier.notify(title, body) {
            log_warning!("Notification not delivered: {e}");
        }
    }

    fn start_sound(&mut self) {
        self.stop_sound();
        if self.settings.sound {
            self.sound_loop = Some(SoundLoop::start(self.sound.clone(), self.beep_duration_ms));
        }
    }

    fn stop_sound(&mut self) {
        if let Some(sound_loop) = self.sound_loop.take() {
            sound_loop.stop();
        }
    }

    /// Fire the alarm `id`: deactivate it and announce it.
    ///
    /// Returns false when the store no longer holds that alarm.
    pub fn trigger(&mut self, store: &mut AlarmStore, id: AlarmId) -> bool {
        let Some(alarm) = store.deactivate(id) else {
            return false;
        };

        self.view.show_ringing(&alarm);
        self.start_sound();
        let body = format!(
            "Your alarm for {} is ringing!",
            alarm.local_target().format("%H:%M")
        );
        self.send_notification(ALARM_NOTIFICATION_TITLE, &body);
        self.ringing = Some(alarm);
        true
    }

    /// Silence the ringing alarm. The alarm stays in the store, inactive.
    pub fn dismiss(&mut self) -> Option<Alarm> {
        let alarm = self.ringing.take()?;
        self.stop_sound();
        self.view.hide_ringing();
        Some(alarm)
    }

    /// Silence the ringing alarm and schedule a copy [`SNOOZE_MINUTES`] after its target.
    ///
    /// Returns `Ok(None)` when nothing was ringing.
    pub fn snooze(&mut self, store: &mut AlarmStore) -> Result<Option<Alarm>, AlarmError> {
        let Some(alarm) = self.dismiss() else {
            return Ok(None);
        };
        store
            .add(alarm.target + TimeDelta::minutes(SNOOZE_MINUTES), alarm.zone)
            .map(Some)
    }

    /// Dismiss if `id` is the ringing alarm; used when alarms are removed.
    pub fn forget(&mut self, id: AlarmId) {
        if self.ringing.as_ref().is_some_and(|alarm| alarm.id == id) {
            self.dismiss();
        }
    }

    /// Play the alarm sound for `duration` and send a sample notification.
    ///
    /// Blocks for `duration` when sound is enabled. Does nothing to a
    /// ringing alarm's sound.
    pub fn test_alarm(&mut self, duration: Duration) {
        self.send_notification(
            TEST_NOTIFICATION_TITLE,
            "This is how your alarm notifications will look!",
        );

        if self.settings.sound && self.ringing.is_none() {
            self.start_sound();
            std::thread::sleep(duration);
            self.stop_sound();
        }
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        self.stop_sound();
    }
}
