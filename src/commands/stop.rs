//! Implementation of the stop command.
//!
//! Terminates the running daemon by sending SIGTERM and waits briefly for
//! it to exit.

use anyhow::Result;
use std::time::Duration;

use crate::io::instance;

const STOP_TIMEOUT: Duration = Duration::from_secs(3);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle the stop command.
pub fn handle_stop_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let info = match instance::get_running_instance()? {
        Some(info) => info,
        None => {
            log_error_exit!("tzalarm isn't running");
            std::process::exit(1);
        }
    };

    log_block_start!("Stopping tzalarm (PID: {})...", info.pid);
    if let Err(e) = instance::terminate_instance(info.pid) {
        log_error_exit!("Failed to terminate instance: {}", e);
        std::process::exit(1);
    }
    if debug_enabled {
        log_pipe!();
        log_debug!("SIGTERM sent to process {}", info.pid);
    }

    let attempts = STOP_TIMEOUT.as_millis() / POLL_INTERVAL.as_millis();
    for _ in 0..attempts {
        if !instance::is_instance_running(info.pid) {
            log_pipe!();
            log_info!("Process terminated successfully");
            log_end!();
            return Ok(());
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    log_pipe!();
    log_warning!("Process did not terminate within the expected time");
    log_indented!("The termination signal was sent, but the process may still be shutting down");
    log_end!();
    Ok(())
}

/// Display detailed help for the stop command
pub fn display_help() {
    log_version!();
    log_block_start!("stop - Stop the running tzalarm");
    log_block_start!("Usage: tzalarm stop");
    log_block_start!("Description:");
    log_indented!("Sends a termination signal to the running daemon and waits");
    log_indented!("up to {} seconds for it to exit.", STOP_TIMEOUT.as_secs());
    log_indented!("Scheduled alarms stay saved for the next `tzalarm run`.");
    log_end!();
}
