//! Help command implementation for tzalarm.
//!
//! Dispatches `tzalarm help [COMMAND]` to the command's detailed help, or
//! shows the general command overview.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("clear") => super::alarm::display_clear_help(),
        Some("convert") | Some("c") => super::convert::display_help(),
        Some("help") | Some("h") => display_help_help(),
        Some("list") | Some("ls") => super::alarm::display_list_help(),
        Some("remove") | Some("rm") => super::alarm::display_remove_help(),
        Some("run") => display_run_help(),
        Some("set") | Some("s") => super::alarm::display_set_help(),
        Some("settings") => super::settings::display_help(),
        Some("simulate") | Some("S") => super::simulate::display_help(),
        Some("stop") => super::stop::display_help(),
        Some("test") | Some("t") => super::test::display_help(),
        Some("zones") | Some("z") => super::zones::display_help(),
        Some(unknown) => {
            log_warning!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
    Ok(())
}

/// Display usage for the bare `tzalarm --help`
pub fn display_usage() {
    log_version!();
    log_block_start!("Usage: tzalarm [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>   Use a custom configuration directory");
    log_indented!("-d, --debug          Enable detailed debug output");
    log_indented!("-h, --help           Print help information");
    log_indented!("-V, --version        Print version information");
    list_commands();
    log_end!();
}

fn list_commands() {
    log_block_start!("Commands:");
    log_indented!("run                        Ring alarms in the foreground (default)");
    log_indented!("convert, c <date> <time>   Convert a time between zones");
    log_indented!("set, s <date> <time>       Schedule an alarm at a converted time");
    log_indented!("list, ls                   Show scheduled alarms");
    log_indented!("remove, rm <id>            Delete one alarm");
    log_indented!("clear                      Delete all alarms");
    log_indented!("zones, z                   List supported timezones");
    log_indented!("settings [<name> <on|off>] Show or change notification and sound");
    log_indented!("test, t                    Try the alarm sound and notification");
    log_indented!("stop                       Stop the running tzalarm");
    log_indented!("simulate, S <start> <end>  Run against a simulated clock");
    log_indented!("help, h [COMMAND]          Show detailed help for a command");
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    list_commands();
    log_pipe!();
    log_info!("Use 'tzalarm help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'tzalarm --help' to see all options and general usage.");
    log_end!();
}

fn display_run_help() {
    log_version!();
    log_block_start!("run - Ring alarms in the foreground");
    log_block_start!("Usage: tzalarm [run]");
    log_block_start!("Description:");
    log_indented!("Watches the scheduled alarms and rings them when due.");
    log_indented!("Only one instance runs at a time; other commands signal it.");
    log_block_start!("Keys (followed by Enter):");
    log_indented!("s  Snooze the ringing alarm for 5 minutes");
    log_indented!("d  Dismiss the ringing alarm");
    log_indented!("q  Quit");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: tzalarm help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("tzalarm help");
    log_indented!("tzalarm help set");
    log_end!();
}
