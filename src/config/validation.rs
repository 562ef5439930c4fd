//! Configuration validation functionality.
//!
//! Rejects unknown zone names and out-of-range values with a message naming
//! the offending field.

use anyhow::Result;

use super::Config;
use crate::common::constants::*;
use crate::time::zones::parse_zone;

/// Validate every field that is set.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(zone) = config.source_zone.as_deref() {
        validate_zone(zone, "source_zone")?;
    }

    if let Some(zone) = config.destination_zone.as_deref() {
        validate_zone(zone, "destination_zone")?;
    }

    // Validate beep duration (50-900ms)
    if let Some(duration) = config.beep_duration
        && !(MINIMUM_BEEP_DURATION_MS..=MAXIMUM_BEEP_DURATION_MS).contains(&duration)
    {
        anyhow::bail!(
            "beep_duration ({} ms) must be between {} and {} milliseconds",
            duration,
            MINIMUM_BEEP_DURATION_MS,
            MAXIMUM_BEEP_DURATION_MS
        );
    }

    Ok(())
}

fn validate_zone(zone: &str, field: &str) -> Result<()> {
    if parse_zone(zone).is_none() {
        anyhow::bail!(
            "{field} '{zone}' is not a known timezone (use an IANA name such as \"Europe/Paris\"; `tzalarm zones` lists common ones)"
        );
    }
    Ok(())
}
