//! Implementation of the alarm commands: set, list, remove and clear.
//!
//! These edit the persisted alarm list directly. A running daemon is sent a
//! reload signal afterwards so it rings what was just scheduled.

use anyhow::Result;

use super::convert::ConversionRequest;
use super::{notify_daemon, open_alarm_store};
use crate::alarm::AlarmId;
use crate::alarm::store::AlarmStore;
use crate::config;
use crate::time::convert::ConvertedTime;
use crate::ui::terminal::print_alarm_list;
use crate::ui::{AlarmView, TerminalView};

/// Handle the set command: convert, then schedule at the converted instant.
pub fn handle_set_command(request: ConversionRequest, debug_enabled: bool) -> Result<()> {
    log_version!();

    let config = config::load()?;
    let result = request.resolve(&config);
    TerminalView::new().render_conversion(&result);

    let Ok(converted) = result else {
        log_end!();
        std::process::exit(1);
    };

    let mut store = open_alarm_store()?;
    match schedule(&mut store, &converted) {
        Ok(()) => {
            notify_daemon(debug_enabled);
            log_end!();
            Ok(())
        }
        Err(message) => {
            log_error_exit!("{}", message);
            std::process::exit(1);
        }
    }
}

/// Add an alarm at the converted instant, shown in the destination zone.
fn schedule(store: &mut AlarmStore, converted: &ConvertedTime) -> Result<(), String> {
    let alarm = store
        .add(converted.instant(), converted.destination_zone())
        .map_err(|e| e.to_string())?;
    log_block_start!("Alarm #{} set for {}", alarm.id, alarm.clock());
    log_indented!("{}", alarm.date_label());
    Ok(())
}

/// Handle the list command.
pub fn handle_list_command() -> Result<()> {
    log_version!();
    let store = open_alarm_store()?;
    print_alarm_list(store.alarms());
    log_end!();
    Ok(())
}

/// Handle the remove command.
pub fn handle_remove_command(id: &str, debug_enabled: bool) -> Result<()> {
    log_version!();

    let Ok(id) = id.parse::<AlarmId>() else {
        log_pipe!();
        log_error!("'{}' is not an alarm id", id);
        log_indented!("Use `tzalarm list` to see alarm ids");
        log_end!();
        std::process::exit(1);
    };

    let mut store = open_alarm_store()?;
    if !store.remove_by_id(id) {
        log_error_exit!("No alarm with id {}", id);
        std::process::exit(1);
    }

    log_block_start!("Alarm #{} removed", id);
    notify_daemon(debug_enabled);
    log_end!();
    Ok(())
}

/// Handle the clear command.
pub fn handle_clear_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let mut store = open_alarm_store()?;
    let count = store.len();
    store.clear_all();

    log_block_start!(
        "Cleared {} alarm{}",
        count,
        if count == 1 { "" } else { "s" }
    );
    notify_daemon(debug_enabled);
    log_end!();
    Ok(())
}

/// Display detailed help for the set command
pub fn display_set_help() {
    log_version!();
    log_block_start!("set - Schedule an alarm");
    log_block_start!("Usage: tzalarm set <date> <time> [--from ZONE] [--to ZONE]");
    log_block_start!("Description:");
    log_indented!("Converts the time like `tzalarm convert` and schedules an alarm");
    log_indented!("at that instant. The alarm is shown in the destination zone.");
    log_indented!("The time must be in the future.");
    log_block_start!("Examples:");
    log_indented!("# Wake up for a 9:00 call in San Francisco");
    log_indented!("tzalarm set 2025-01-15 09:00 --from America/Los_Angeles");
    log_end!();
}

/// Display detailed help for the list command
pub fn display_list_help() {
    log_version!();
    log_block_start!("list - Show scheduled alarms");
    log_block_start!("Usage: tzalarm list");
    log_block_start!("Description:");
    log_indented!("Lists every stored alarm with its id, time and zone.");
    log_indented!("Alarms that already rang are marked as fired.");
    log_end!();
}

/// Display detailed help for the remove command
pub fn display_remove_help() {
    log_version!();
    log_block_start!("remove - Delete one alarm");
    log_block_start!("Usage: tzalarm remove <id>");
    log_block_start!("Examples:");
    log_indented!("tzalarm list");
    log_indented!("tzalarm remove 1736935200000");
    log_end!();
}

/// Display detailed help for the clear command
pub fn display_clear_help() {
    log_version!();
    log_block_start!("clear - Delete all alarms");
    log_block_start!("Usage: tzalarm clear");
    log_end!();
}
