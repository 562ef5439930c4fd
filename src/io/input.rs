//! Keyboard commands for the foreground daemon.
//!
//! Lines typed into the daemon's terminal become [`SignalMessage`]s:
//! `s` snoozes, `d` dismisses and `q` quits.

use std::io::BufRead;
use std::sync::mpsc::Sender;

use super::signals::SignalMessage;

/// Map one input line to a message.
pub fn parse_command(line: &str) -> Option<SignalMessage> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "snooze" => Some(SignalMessage::Snooze),
        "d" | "dismiss" => Some(SignalMessage::Dismiss),
        "q" | "quit" | "exit" => Some(SignalMessage::Shutdown),
        _ => None,
    }
}

/// Read stdin on a background thread until EOF or the loop goes away.
///
/// EOF only ends the thread; a daemon without a terminal keeps running.
pub fn spawn_input_thread(sender: Sender<SignalMessage>) {
    let spawned = std::thread::Builder::new()
        .name("keyboard".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(message) => {
                        if sender.send(message).is_err() {
                            break;
                        }
                    }
                    None => log_indented!("Unknown key '{}': use s, d or q", line.trim()),
                }
            }
        });

    if let Err(e) = spawned {
        log_warning!("Keyboard input unavailable: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("s"), Some(SignalMessage::Snooze));
        assert_eq!(parse_command(" Snooze \n"), Some(SignalMessage::Snooze));
        assert_eq!(parse_command("d"), Some(SignalMessage::Dismiss));
        assert_eq!(parse_command("q"), Some(SignalMessage::Shutdown));
        assert_eq!(parse_command("x"), None);
        assert_eq!(parse_command(""), None);
    }
}
