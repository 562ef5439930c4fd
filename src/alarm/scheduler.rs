//! The periodic tick that detects due alarms.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use super::AlarmId;
use super::lifecycle::LifecycleController;
use super::store::AlarmStore;
use crate::common::constants::{GRACE_WINDOW_MINUTES, TRIGGER_TOLERANCE_SECS};
use crate::common::utils::format_countdown;

/// When a tick considers an alarm due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Fire only when a tick lands within the tolerance of the target.
    /// A tick that arrives late skips the alarm.
    #[default]
    Strict,
    /// Also fire late, as long as the target is still inside the grace window.
    CatchUp,
}

impl TriggerPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerPolicy::Strict => "strict",
            TriggerPolicy::CatchUp => "catch_up",
        }
    }

    pub fn is_due(&self, target: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let tolerance = TimeDelta::seconds(TRIGGER_TOLERANCE_SECS);
        let offset = target - now;
        match self {
            TriggerPolicy::Strict => offset.abs() < tolerance,
            TriggerPolicy::CatchUp => {
                offset < tolerance && -offset <= TimeDelta::minutes(GRACE_WINDOW_MINUTES)
            }
        }
    }
}

/// What one tick did.
#[derive(Debug, Default, PartialEq)]
pub struct TickReport {
    /// Countdown to the next alarm, as rendered.
    pub countdown: Option<String>,
    pub triggered: Vec<AlarmId>,
    pub pruned: usize,
}

/// Runs ticks against a store and hands due alarms to the controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    policy: TriggerPolicy,
}

impl Scheduler {
    pub fn new(policy: TriggerPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    /// Run one tick at `now`.
    ///
    /// Publishes the countdown, triggers every active alarm inside the
    /// trigger window, then prunes expired alarms.
    pub fn tick(
        &self,
        now: DateTime<Utc>,
        store: &mut AlarmStore,
        controller: &mut LifecycleController,
    ) -> TickReport {
        let countdown = store
            .next_due(now)
            .map(|alarm| format_countdown(alarm.target - now));
        controller.view().render_countdown(countdown.as_deref());

        let due: Vec<AlarmId> = store
            .alarms()
            .iter()
            .filter(|alarm| alarm.is_active && self.policy.is_due(alarm.target, now))
            .map(|alarm| alarm.id)
            .collect();

        let mut triggered = Vec::with_capacity(due.len());
        for id in due {
            if controller.trigger(store, id) {
                triggered.push(id);
            }
        }

        let pruned = store.prune(now);

        TickReport {
            countdown,
            triggered,
            pruned,
        }
    }
}
