//! Alarm data model and the engine that schedules and rings alarms.
//!
//! An [`Alarm`] is an absolute instant plus the zone it is displayed in.
//! The pieces that act on alarms are layered:
//!
//! - [`store::AlarmStore`]: the ordered collection, its persistence and pruning
//! - [`scheduler::Scheduler`]: the periodic tick that finds due alarms
//! - [`lifecycle::LifecycleController`]: the ringing state machine
//!   (`Pending → Ringing → Dismissed | Snoozed`)
//! - [`engine::AlarmEngine`]: one owned instance wiring the three together

pub mod engine;
pub mod lifecycle;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Unique alarm identifier, increasing in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmId(pub u64);

impl std::fmt::Display for AlarmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AlarmId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(AlarmId)
    }
}

/// A scheduled alarm.
#[derive(Debug, Clone, PartialEq)]
pub struct Alarm {
    pub id: AlarmId,
    /// Absolute moment the alarm fires.
    pub target: DateTime<Utc>,
    /// Zone the target is displayed in.
    pub zone: Tz,
    /// Eligible to trigger; cleared the moment the alarm fires.
    pub is_active: bool,
}

impl Alarm {
    /// The target expressed in the alarm's zone.
    pub fn local_target(&self) -> DateTime<Tz> {
        self.target.with_timezone(&self.zone)
    }

    /// `HH:MM:SS` in the alarm's zone.
    pub fn clock(&self) -> String {
        self.local_target().format("%H:%M:%S").to_string()
    }

    /// `Month D, YYYY (Zone/Name)` in the alarm's zone.
    pub fn date_label(&self) -> String {
        format!(
            "{} ({})",
            self.local_target().format("%B %-d, %Y"),
            self.zone.name()
        )
    }
}

/// Errors from creating alarms.
#[derive(Debug, Clone, PartialEq)]
pub enum AlarmError {
    /// The requested target is not in the future.
    PastInstant {
        target: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}

impl std::fmt::Display for AlarmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlarmError::PastInstant { target, now } => write!(
                f,
                "Alarm time must be in the future ({} is not after {})",
                target.to_rfc3339(),
                now.to_rfc3339()
            ),
        }
    }
}

impl std::error::Error for AlarmError {}

/// Errors reading persisted alarms or settings.
#[derive(Debug)]
pub enum PersistenceError {
    /// The backing storage could not be read.
    Unreadable(String),
    /// The stored blob is not valid.
    Corrupt(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Unreadable(reason) => write!(f, "Stored data unreadable: {reason}"),
            PersistenceError::Corrupt(reason) => write!(f, "Stored data corrupt: {reason}"),
        }
    }
}

impl std::error::Error for PersistenceError {}
