//! Main application entry point and command dispatch.
//!
//! Parses the command line, applies the global `--config` directory and
//! hands off to the matching command, or to [`TzAlarm`] for the foreground
//! daemon. Any error that reaches this level is logged and the process exits
//! with status 1.

#[macro_use]
extern crate tzalarm;

use anyhow::Result;

use tzalarm::TzAlarm;
use tzalarm::args::{self, CliAction, ParsedArgs};
use tzalarm::commands;
use tzalarm::common::constants::EXIT_FAILURE;
use tzalarm::config;

fn main() {
    if let Err(e) = run(ParsedArgs::from_env()) {
        log_error_exit!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn run(parsed_args: ParsedArgs) -> Result<()> {
    let debug_enabled = parsed_args.debug_enabled;
    config::set_config_dir(parsed_args.config_dir)?;

    match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            commands::help::display_usage();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            commands::help::display_usage();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Help { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Run => TzAlarm::new(debug_enabled).run(),
        CliAction::Convert(request) => commands::convert::handle_convert_command(request),
        CliAction::Set(request) => commands::alarm::handle_set_command(request, debug_enabled),
        CliAction::List => commands::alarm::handle_list_command(),
        CliAction::Remove { id } => commands::alarm::handle_remove_command(&id, debug_enabled),
        CliAction::Clear => commands::alarm::handle_clear_command(debug_enabled),
        CliAction::Zones => commands::zones::handle_zones_command(),
        CliAction::Settings { change } => {
            commands::settings::handle_settings_command(change, debug_enabled)
        }
        CliAction::Test => commands::test::handle_test_command(),
        CliAction::Stop => commands::stop::handle_stop_command(debug_enabled),
        CliAction::Simulate(request) => {
            commands::simulate::handle_simulate_command(request, debug_enabled)
        }
    }
}
