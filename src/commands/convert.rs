//! Implementation of the convert command.
//!
//! Converts a date and time read in the source zone into the destination
//! zone. Zones given on the command line override the configured ones.

use anyhow::Result;

use crate::config::{self, Config};
use crate::time::convert::{ConversionError, ConvertedTime, convert};
use crate::ui::{AlarmView, TerminalView};

/// Conversion inputs as typed on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub date: String,
    pub time: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ConversionRequest {
    /// Run the conversion, filling unset zones from `config`.
    pub fn resolve(&self, config: &Config) -> Result<ConvertedTime, ConversionError> {
        let source = self
            .from
            .clone()
            .unwrap_or_else(|| config.source_tz().name().to_string());
        let destination = self
            .to
            .clone()
            .unwrap_or_else(|| config.destination_tz().name().to_string());
        convert(&self.date, &self.time, &source, &destination)
    }
}

/// Handle the convert command.
pub fn handle_convert_command(request: ConversionRequest) -> Result<()> {
    log_version!();

    let config = config::load()?;
    let result = request.resolve(&config);
    TerminalView::new().render_conversion(&result);

    if result.is_err() {
        log_end!();
        std::process::exit(1);
    }

    log_end!();
    Ok(())
}

/// Display detailed help for the convert command
pub fn display_help() {
    log_version!();
    log_block_start!("convert - Convert a time between zones");
    log_block_start!("Usage: tzalarm convert <date> <time> [--from ZONE] [--to ZONE]");
    log_block_start!("Arguments:");
    log_indented!("date         YYYY-MM-DD");
    log_indented!("time         HH:MM or HH:MM:SS");
    log_block_start!("Options:");
    log_indented!("--from ZONE  Zone the time is read in (default: source_zone)");
    log_indented!("--to ZONE    Zone to convert into (default: destination_zone)");
    log_block_start!("Description:");
    log_indented!("Times that do not exist or occur twice in the source zone,");
    log_indented!("because of a daylight saving change, are rejected.");
    log_block_start!("Examples:");
    log_indented!("# Morning in New York, seen from Tokyo");
    log_indented!("tzalarm convert 2025-01-15 09:30 --from America/New_York --to Asia/Tokyo");
    log_pipe!();
    log_indented!("# Use the configured zones");
    log_indented!("tzalarm convert 2025-01-15 18:00");
    log_end!();
}
