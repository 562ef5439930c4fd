//! Configuration system for tzalarm.
//!
//! Configuration lives in `tzalarm.toml` under `$XDG_CONFIG_HOME/tzalarm/`, or
//! in the directory passed with `--config`. Every field is optional:
//!
//! ```toml
//! #[Zones]
//! source_zone = "Europe/Paris"     # Zone the entered date and time are read in
//! destination_zone = "UTC"         # Zone the alarm is shown in
//!
//! #[Alarms]
//! trigger_policy = "strict"        # "strict" or "catch_up"
//! beep_duration = 500              # Beep length in ms (50-900, ignored by the terminal bell)
//! ```
//!
//! A commented default file is written the first time tzalarm runs without
//! one. Zone names are validated against the tz database and numeric values
//! against their ranges before the configuration is used.

pub mod builder;
pub mod loading;
pub mod validation;


use chrono_tz::Tz;
use serde::Deserialize;

use crate::alarm::scheduler::TriggerPolicy;
use crate::common::constants::*;
use crate::common::utils::private_path;
use crate::time::zones::{detect_local_zone, parse_zone};

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Parsed `tzalarm.toml`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Zone conversion inputs are read in; the local zone when unset.
    pub source_zone: Option<String>,
    /// Zone conversions and alarms are expressed in.
    pub destination_zone: Option<String>,
    pub trigger_policy: Option<TriggerPolicy>,
    /// Beep length in milliseconds.
    pub beep_duration: Option<u64>,
}

impl Config {
    /// Source zone, falling back to the detected local zone.
    pub fn source_tz(&self) -> Tz {
        self.source_zone
            .as_deref()
            .and_then(parse_zone)
            .unwrap_or_else(detect_local_zone)
    }

    pub fn destination_tz(&self) -> Tz {
        self.destination_zone
            .as_deref()
            .and_then(parse_zone)
            .or_else(|| parse_zone(DEFAULT_DESTINATION_ZONE))
            .unwrap_or(Tz::UTC)
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.trigger_policy.unwrap_or_default()
    }

    pub fn beep_duration_ms(&self) -> u64 {
        self.beep_duration.unwrap_or(DEFAULT_BEEP_DURATION_MS)
    }

    /// Print the effective configuration.
    pub fn log_config(&self) {
        match get_config_path() {
            Ok(path) => log_block_start!("Loaded configuration from {}", private_path(&path)),
            Err(_) => log_block_start!("Loaded configuration"),
        }

        let source_note = if self.source_zone.is_some() {
            ""
        } else {
            " (detected)"
        };
        log_indented!("Source zone: {}{}", self.source_tz().name(), source_note);
        log_indented!("Destination zone: {}", self.destination_tz().name());
        log_indented!("Trigger policy: {}", self.policy().as_str());
        log_indented!("Beep duration: {}ms", self.beep_duration_ms());
    }
}
