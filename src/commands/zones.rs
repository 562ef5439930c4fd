//! Implementation of the zones command: list the supported timezones.

use anyhow::Result;

use crate::time::source;
use crate::time::zones::{supported_zones, zone_label};

/// Handle the zones command.
pub fn handle_zones_command() -> Result<()> {
    log_version!();

    let now = source::now();
    let zones = supported_zones();
    log_block_start!("Supported zones ({}):", zones.len());
    for zone in zones {
        log_indented!("{:<32} {}", zone.name(), zone_label(zone, now));
    }

    log_pipe!();
    log_info!("Any IANA zone name is accepted by --from, --to and the config file");
    log_end!();
    Ok(())
}

/// Display detailed help for the zones command
pub fn display_help() {
    log_version!();
    log_block_start!("zones - List supported timezones");
    log_block_start!("Usage: tzalarm zones");
    log_block_start!("Description:");
    log_indented!("Shows the curated zones with their current UTC offset.");
    log_end!();
}
