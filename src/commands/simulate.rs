//! Implementation of the simulate command for testing alarm timing.
//!
//! Runs the daemon against a simulated clock, accelerated or fast-forwarded,
//! so alarms far in the future can be watched ringing within seconds. The
//! simulation works on an in-memory copy of the stored alarms and settings;
//! nothing it does is written back.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use std::sync::Arc;

use super::open_persistence;
use crate::common::constants::{ALARMS_KEY, SETTINGS_KEY};
use crate::common::logger::Log;
use crate::state::{KeyValueStore, MemoryStore};
use crate::time::source::{self, SimulatedTimeSource, TimeSource};
use crate::tzalarm::TzAlarm;

/// Simulation bounds as typed on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub start: String,
    pub end: String,
    /// Simulated seconds per real second; 0 fast-forwards.
    pub multiplier: f64,
    pub log_to_file: bool,
}

/// Parse and check the simulation bounds.
pub fn parse_bounds(start: &str, end: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = source::parse_local_datetime(start)
        .map_err(|e| anyhow::anyhow!("Invalid start time: {}", e))?;
    let end = source::parse_local_datetime(end)
        .map_err(|e| anyhow::anyhow!("Invalid end time: {}", e))?;
    if end <= start {
        anyhow::bail!("End time must be after start time");
    }
    Ok((start, end))
}

/// Copy the stored alarms and settings into memory.
fn snapshot(persistence: &dyn KeyValueStore) -> MemoryStore {
    let mut snapshot = MemoryStore::new();
    for key in [ALARMS_KEY, SETTINGS_KEY] {
        match persistence.get(key) {
            Ok(Some(blob)) => snapshot = snapshot.with_entry(key, &blob),
            Ok(None) => {}
            Err(e) => log_warning!("Could not read stored {key}: {e}"),
        }
    }
    snapshot
}

/// Handle the simulate command.
pub fn handle_simulate_command(request: SimulationRequest, debug_enabled: bool) -> Result<()> {
    let (start, end) = parse_bounds(&request.start, &request.end)?;

    // Register the clock before any output so every line carries simulated time
    let clock: Arc<dyn TimeSource> =
        Arc::new(SimulatedTimeSource::new(start, end, request.multiplier));
    source::init_time_source(clock.clone());

    let _log_guard = if request.log_to_file {
        let file_name = format!(
            "tzalarm-simulation-{}.log",
            Local::now().format("%Y%m%d-%H%M%S")
        );
        println!("Writing simulation output to {file_name}");
        Some(Log::start_file_logging(file_name).context("Failed to start file logging")?)
    } else {
        None
    };

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        end.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );

    let duration = end - start;
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );
    if request.multiplier == 0.0 {
        log_indented!("Time acceleration: fast-forward (one tick per step)");
    } else {
        log_indented!(
            "Time acceleration: {}x (will complete in ~{:.1} seconds)",
            request.multiplier,
            duration.num_seconds() as f64 / request.multiplier
        );
    }
    log_indented!("Stored alarms are copied; changes are not saved");

    let persistence: Arc<dyn KeyValueStore> = Arc::new(snapshot(open_persistence()?.as_ref()));

    TzAlarm::new(debug_enabled)
        .without_lock()
        .without_headers()
        .with_clock(clock)
        .with_persistence(persistence)
        .run()?;

    log_end!();
    Ok(())
}

/// Display detailed help for the simulate command
pub fn display_help() {
    log_version!();
    log_block_start!("simulate - Run against a simulated clock");
    log_block_start!("Usage: tzalarm simulate <start> <end> [multiplier] [--log]");
    log_block_start!("Arguments:");
    log_indented!("start       Local start time, \"YYYY-MM-DD HH:MM:SS\"");
    log_indented!("end         Local end time, \"YYYY-MM-DD HH:MM:SS\"");
    log_indented!("multiplier  Simulated seconds per real second (default: 60)");
    log_indented!("            0 fast-forwards one tick at a time");
    log_block_start!("Options:");
    log_indented!("--log       Write output to tzalarm-simulation-<time>.log");
    log_block_start!("Examples:");
    log_indented!("tzalarm simulate \"2025-01-15 08:55:00\" \"2025-01-15 09:10:00\" 30");
    log_end!();
}
