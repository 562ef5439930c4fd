//! Implementation of the settings command.
//!
//! Shows or changes the persisted `{notifications, sound}` toggles. Turning
//! notifications on asks the notification service first; when it refuses,
//! the toggle stays off.

use anyhow::Result;

use super::{notify_daemon, open_persistence};
use crate::common::utils::{parse_switch, switch_label};
use crate::io::notify::{DesktopNotifier, Notifier, Permission};
use crate::state::settings::Settings;

/// A toggle that can be changed from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    Notifications,
    Sound,
}

impl SettingField {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "notifications" | "notification" | "notify" => Some(Self::Notifications),
            "sound" => Some(Self::Sound),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Notifications => "notifications",
            Self::Sound => "sound",
        }
    }
}

/// Apply one change, asking `notifier` before enabling notifications.
pub fn apply_change(
    mut settings: Settings,
    field: SettingField,
    enabled: bool,
    notifier: &dyn Notifier,
) -> Result<Settings, String> {
    match field {
        SettingField::Notifications => {
            if enabled && notifier.request_permission() == Permission::Denied {
                return Err("Notification service unavailable, notifications stay off".into());
            }
            settings.notifications = enabled;
        }
        SettingField::Sound => settings.sound = enabled,
    }
    Ok(settings)
}

fn log_settings(settings: &Settings) {
    log_indented!("notifications: {}", switch_label(settings.notifications));
    log_indented!("sound: {}", switch_label(settings.sound));
}

/// Handle the settings command.
///
/// With no change, prints the current settings.
pub fn handle_settings_command(change: Option<(String, String)>, debug_enabled: bool) -> Result<()> {
    log_version!();

    let persistence = open_persistence()?;
    let settings = Settings::load(persistence.as_ref());

    let Some((field_name, value)) = change else {
        log_block_start!("Settings:");
        log_settings(&settings);
        log_end!();
        return Ok(());
    };

    let Some(field) = SettingField::parse(&field_name) else {
        log_error_exit!("Unknown setting '{}' (expected notifications or sound)", field_name);
        std::process::exit(1);
    };
    let Some(enabled) = parse_switch(&value) else {
        log_error_exit!("Invalid value '{}' for {}: use on or off", value, field.name());
        std::process::exit(1);
    };

    let notifier = DesktopNotifier::connect();
    match apply_change(settings, field, enabled, &notifier) {
        Ok(updated) => {
            updated.save(persistence.as_ref());
            log_block_start!("Updated {}: {}", field.name(), switch_label(enabled));
            log_settings(&updated);
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

/// Display detailed help for the settings command
pub fn display_help() {
    log_version!();
    log_block_start!("settings - Show or change alarm settings");
    log_block_start!("Usage: tzalarm settings [notifications|sound <on|off>]");
    log_block_start!("Settings:");
    log_indented!("notifications  Desktop notification when an alarm rings (default: off)");
    log_indented!("sound          Terminal bell while an alarm rings (default: on)");
    log_block_start!("Examples:");
    log_indented!("# Show current settings");
    log_indented!("tzalarm settings");
    log_pipe!();
    log_indented!("# Enable desktop notifications");
    log_indented!("tzalarm settings notifications on");
    log_end!();
}
