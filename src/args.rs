//! Command-line argument parsing and processing.
//!
//! Arguments are split into global flags (`--debug`, `--config`, `--help`,
//! `--version`), command options (`--from`, `--to`, `--log`) and positional
//! words. The first positional word selects the command; the rest are its
//! arguments.

use crate::commands::convert::ConversionRequest;
use crate::commands::simulate::SimulationRequest;

/// Default simulation speed: one simulated minute per real second.
const DEFAULT_SIMULATION_MULTIPLIER: f64 = 60.0;

/// Represents the parsed command-line action.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the foreground daemon
    Run,
    Convert(ConversionRequest),
    /// Convert and schedule an alarm
    Set(ConversionRequest),
    List,
    Remove {
        id: String,
    },
    Clear,
    Zones,
    /// Show settings, or change one toggle
    Settings {
        change: Option<(String, String)>,
    },
    Test,
    Stop,
    Simulate(SimulationRequest),
    /// `help [COMMAND]`
    Help {
        command: Option<String>,
    },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
#[derive(Debug, PartialEq)]
pub struct ParsedArgs {
    pub action: CliAction,
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
}

/// Options that only some commands accept.
#[derive(Default)]
struct CommandOptions {
    from: Option<String>,
    to: Option<String>,
    log_to_file: bool,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;
        let mut config_dir: Option<String> = None;
        let mut options = CommandOptions::default();
        let mut positional: Vec<String> = Vec::new();

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            let arg_str = args_vec[i].as_str();
            // Flags that take a value consume the next argument
            let value = args_vec.get(i + 1).filter(|next| !next.starts_with("--"));

            match arg_str {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--log" => options.log_to_file = true,
                "--config" | "-c" | "--from" | "--to" => match value {
                    Some(value) => {
                        let value = Some(value.clone());
                        match arg_str {
                            "--from" => options.from = value,
                            "--to" => options.to = value,
                            _ => config_dir = value,
                        }
                        i += 1;
                    }
                    None => {
                        log_warning!("Missing value for {}", arg_str);
                        unknown_arg_found = true;
                    }
                },
                _ if arg_str.starts_with('-') && arg_str.len() > 1 => {
                    log_warning!("Unknown option: {arg_str}");
                    unknown_arg_found = true;
                }
                _ => positional.push(arg_str.to_string()),
            }
            i += 1;
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            match positional.first() {
                // `tzalarm set --help` shows the command's own help
                Some(command) => CliAction::Help {
                    command: Some(command.clone()),
                },
                None => CliAction::ShowHelp,
            }
        } else {
            parse_command(&positional, options)
        };

        ParsedArgs {
            action,
            debug_enabled,
            config_dir,
        }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Select the command from the positional words.
fn parse_command(positional: &[String], options: CommandOptions) -> CliAction {
    let Some((command, rest)) = positional.split_first() else {
        return reject_options("run", &options).unwrap_or(CliAction::Run);
    };
    let command = command.as_str();

    if !matches!(command, "convert" | "c" | "set" | "s")
        && (options.from.is_some() || options.to.is_some())
    {
        log_warning!("--from and --to only apply to convert and set");
        return CliAction::ShowHelpDueToError;
    }
    if let Some(action) = reject_options(command, &options) {
        return action;
    }

    match command {
        "run" => no_arguments(command, rest, CliAction::Run),
        "convert" | "c" | "set" | "s" => {
            let [date, time] = rest else {
                log_warning!(
                    "Expected a date and a time. Usage: tzalarm {} <date> <time> [--from ZONE] [--to ZONE]",
                    command
                );
                return CliAction::ShowHelpDueToError;
            };
            let request = ConversionRequest {
                date: date.clone(),
                time: time.clone(),
                from: options.from,
                to: options.to,
            };
            if matches!(command, "convert" | "c") {
                CliAction::Convert(request)
            } else {
                CliAction::Set(request)
            }
        }
        "list" | "ls" => no_arguments(command, rest, CliAction::List),
        "remove" | "rm" => match rest {
            [id] => CliAction::Remove { id: id.clone() },
            _ => {
                log_warning!("Expected one alarm id. Usage: tzalarm remove <id>");
                CliAction::ShowHelpDueToError
            }
        },
        "clear" => no_arguments(command, rest, CliAction::Clear),
        "zones" | "z" => no_arguments(command, rest, CliAction::Zones),
        "settings" => match rest {
            [] => CliAction::Settings { change: None },
            [field, value] => CliAction::Settings {
                change: Some((field.clone(), value.clone())),
            },
            _ => {
                log_warning!("Usage: tzalarm settings [notifications|sound <on|off>]");
                CliAction::ShowHelpDueToError
            }
        },
        "test" | "t" => no_arguments(command, rest, CliAction::Test),
        "stop" => no_arguments(command, rest, CliAction::Stop),
        "simulate" | "S" => parse_simulate(rest, options.log_to_file),
        "help" | "h" => match rest {
            [] => CliAction::Help { command: None },
            [topic] => CliAction::Help {
                command: Some(topic.clone()),
            },
            _ => {
                log_warning!("Usage: tzalarm help [COMMAND]");
                CliAction::ShowHelpDueToError
            }
        },
        _ => {
            log_warning!("Unknown command: {}", command);
            CliAction::ShowHelpDueToError
        }
    }
}

/// `--log` belongs to simulate only.
fn reject_options(command: &str, options: &CommandOptions) -> Option<CliAction> {
    if options.log_to_file && !matches!(command, "simulate" | "S") {
        log_warning!("--log only applies to simulate");
        return Some(CliAction::ShowHelpDueToError);
    }
    None
}

fn no_arguments(command: &str, rest: &[String], action: CliAction) -> CliAction {
    match rest.first() {
        None => action,
        Some(extra) => {
            log_warning!("Unexpected argument '{}' for {}", extra, command);
            CliAction::ShowHelpDueToError
        }
    }
}

fn parse_simulate(rest: &[String], log_to_file: bool) -> CliAction {
    let (start, end, multiplier) = match rest {
        [start, end] => (start, end, None),
        [start, end, multiplier] => (start, end, Some(multiplier)),
        _ => {
            log_warning!(
                "Usage: tzalarm simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\" [multiplier] [--log]"
            );
            return CliAction::ShowHelpDueToError;
        }
    };

    let multiplier = match multiplier {
        None => DEFAULT_SIMULATION_MULTIPLIER,
        Some(text) => match text.parse::<f64>() {
            Ok(mult) if mult == 0.0 || (0.1..=3600.0).contains(&mult) => mult,
            _ => {
                log_error!(
                    "Invalid multiplier: {}. Use 0 (fast-forward) or 0.1 to 3600.",
                    text
                );
                return CliAction::ShowHelpDueToError;
            }
        },
    };

    CliAction::Simulate(SimulationRequest {
        start: start.clone(),
        end: end.clone(),
        multiplier,
        log_to_file,
    })
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}
