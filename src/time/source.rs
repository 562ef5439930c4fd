//! Clock abstraction for real and simulated time.
//!
//! Everything that asks "what time is it" or waits for the next tick goes
//! through a [`TimeSource`]. The daemon hands an `Arc<dyn TimeSource>` to the
//! alarm engine explicitly; the process-wide source registered with
//! [`init_time_source`] exists so the logger can stamp simulated output.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration as StdDuration, Instant};

static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Source of the current instant and of tick waits.
pub trait TimeSource: Send + Sync {
    /// Current absolute instant.
    fn now(&self) -> DateTime<Utc>;

    /// Wait for `duration` (or simulate waiting).
    fn sleep(&self, duration: StdDuration);

    fn is_simulated(&self) -> bool;

    /// Whether a simulation reached its end (always false for real time).
    fn is_ended(&self) -> bool {
        false
    }
}

/// Wall-clock time.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Simulated time running from `start` to `end`.
///
/// With a positive multiplier, simulated time advances continuously at that
/// rate (60.0 = one simulated minute per real second). With a multiplier of
/// 0.0 the source fast-forwards: time only moves when [`TimeSource::sleep`]
/// is called, by exactly the requested duration. Tests use fast-forward mode
/// as a deterministic clock.
pub struct SimulatedTimeSource {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    multiplier: f64,
    // Fast-forward position; unused in accelerated mode
    position: Mutex<DateTime<Utc>>,
    // Real instant the accelerated simulation started at
    started_at: Instant,
}

impl SimulatedTimeSource {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, multiplier: f64) -> Self {
        Self {
            start,
            end,
            multiplier: if multiplier < 0.0 { 0.0 } else { multiplier },
            position: Mutex::new(start),
            started_at: Instant::now(),
        }
    }

    /// Fast-forward clock starting at `start` with no practical end.
    pub fn fast_forward(start: DateTime<Utc>) -> Self {
        Self::new(start, start + TimeDelta::days(365 * 100), 0.0)
    }

    fn is_fast_forward(&self) -> bool {
        self.multiplier == 0.0
    }

    fn current_time(&self) -> DateTime<Utc> {
        if self.is_fast_forward() {
            return *self.position.lock().unwrap_or_else(PoisonError::into_inner);
        }

        let simulated_secs = self.started_at.elapsed().as_secs_f64() * self.multiplier;
        let elapsed = TimeDelta::milliseconds((simulated_secs * 1000.0) as i64);
        (self.start + elapsed).min(self.end)
    }

    /// Move a fast-forward clock by `delta` without the real-time yield.
    pub fn advance(&self, delta: TimeDelta) {
        let mut position = self.position.lock().unwrap_or_else(PoisonError::into_inner);
        *position = position
            .checked_add_signed(delta)
            .unwrap_or(self.end)
            .min(self.end);
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.current_time()
    }

    fn sleep(&self, duration: StdDuration) {
        if self.is_fast_forward() {
            let delta = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
            self.advance(delta);
            // Let helper threads and the log writer run
            std::thread::sleep(StdDuration::from_millis(1));
            return;
        }

        let remaining = (self.end - self.current_time()).to_std().unwrap_or_default();
        let simulated = duration.min(remaining);
        if !simulated.is_zero() {
            std::thread::sleep(simulated.div_f64(self.multiplier));
        }
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.current_time() >= self.end
    }
}

/// Register the process-wide time source (first call wins).
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// The process-wide time source, real time unless a simulation registered one.
pub fn current() -> Arc<dyn TimeSource> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).clone()
}

pub fn now() -> DateTime<Utc> {
    current().now()
}

pub fn is_simulated() -> bool {
    current().is_simulated()
}

/// Parse `YYYY-MM-DD HH:MM:SS` as local time.
pub fn parse_local_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    let naive = chrono::NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;
    chrono::Local
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| "Ambiguous or invalid local time".to_string())
}
