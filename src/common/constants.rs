//! Application-wide constants.
//!
//! Timing values that define alarm behaviour live here so the scheduler,
//! the lifecycle controller and the tests agree on them.

use std::time::Duration;

// # Alarm timing

/// Interval between scheduler ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// An alarm fires when its target is within this many seconds of a tick.
pub const TRIGGER_TOLERANCE_SECS: i64 = 1;

/// How long a fired alarm is retained before it is pruned.
pub const GRACE_WINDOW_MINUTES: i64 = 5;

/// Offset of a snoozed alarm from the original target.
pub const SNOOZE_MINUTES: i64 = 5;

// # Sound

/// Interval between beeps while an alarm rings.
pub const BEEP_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_BEEP_DURATION_MS: u64 = 500;
pub const MINIMUM_BEEP_DURATION_MS: u64 = 50;
pub const MAXIMUM_BEEP_DURATION_MS: u64 = 900;

/// How long `tzalarm test` keeps the alarm sound going.
pub const TEST_ALARM_DURATION: Duration = Duration::from_secs(3);

// # Zones

pub const DEFAULT_DESTINATION_ZONE: &str = "UTC";

// # Persistence keys

pub const ALARMS_KEY: &str = "alarms";
pub const SETTINGS_KEY: &str = "settings";

// # Notifications

pub const APP_NAME: &str = "tzalarm";
pub const ALARM_NOTIFICATION_TITLE: &str = "⏰ Alarm!";
pub const TEST_NOTIFICATION_TITLE: &str = "🔊 Test Notification";

// # Exit codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
