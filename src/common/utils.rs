//! Small helpers shared across modules.

use chrono::TimeDelta;
use std::path::Path;

/// Render a path with the home directory shortened to `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

/// Format a remaining duration as `{h}h {m}m {s}s`, each unit floored.
///
/// Negative durations render as zero.
pub fn format_countdown(remaining: TimeDelta) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours}h {minutes}m {seconds}s")
}

/// Parse an `on`/`off` style flag.
pub fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub fn switch_label(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_countdown_floors_units() {
        assert_eq!(format_countdown(TimeDelta::seconds(0)), "0h 0m 0s");
        assert_eq!(format_countdown(TimeDelta::seconds(59)), "0h 0m 59s");
        assert_eq!(format_countdown(TimeDelta::milliseconds(61_999)), "0h 1m 1s");
        assert_eq!(format_countdown(TimeDelta::seconds(3 * 3600 + 5)), "3h 0m 5s");
        assert_eq!(format_countdown(TimeDelta::hours(30)), "30h 0m 0s");
    }

    #[test]
    fn test_format_countdown_negative_is_zero() {
        assert_eq!(format_countdown(TimeDelta::seconds(-10)), "0h 0m 0s");
    }

    #[test]
    fn test_parse_switch() {
        assert_eq!(parse_switch("ON"), Some(true));
        assert_eq!(parse_switch("off"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
    }
}
