//! Terminal rendering through the logger.

use crate::alarm::Alarm;
use crate::common::logger::Log;
use crate::time::convert::{ConversionError, ConvertedTime};

use super::{AlarmView, ToastKind};

/// Draws engine output as log blocks; the countdown lives on the status line.
#[derive(Default)]
pub struct TerminalView {
    // Set for one-shot CLI commands, which print their own summary
    quiet_list: bool,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// A view that does not re-print the alarm list after each change.
    pub fn without_list() -> Self {
        Self { quiet_list: true }
    }
}

/// Log the alarm list as an indented block.
pub fn print_alarm_list(alarms: &[Alarm]) {
    if alarms.is_empty() {
        log_block_start!("No alarms set");
        return;
    }

    log_block_start!("Alarms ({}):", alarms.len());
    for alarm in alarms {
        let status = if alarm.is_active { "active" } else { "fired" };
        log_indented!(
            "#{} {} {} [{}]",
            alarm.id,
            alarm.clock(),
            alarm.date_label(),
            status
        );
    }
}

impl AlarmView for TerminalView {
    fn render_conversion(&self, result: &Result<ConvertedTime, ConversionError>) {
        match result {
            Ok(converted) => {
                log_block_start!(
                    "{} {}",
                    converted.source.format("%Y-%m-%d %H:%M:%S"),
                    converted.source.timezone().name()
                );
                log_decorated!(
                    "→ {} {}",
                    converted.clock(),
                    converted.destination_zone().name()
                );
                log_indented!("{}", converted.calendar_date());
                log_indented!("{}", converted.zone_name());
            }
            Err(e) => log_error!("{e}"),
        }
    }

    fn render_alarm_list(&self, alarms: &[Alarm]) {
        if !self.quiet_list {
            print_alarm_list(alarms);
        }
    }

    fn render_countdown(&self, countdown: Option<&str>) {
        match countdown {
            Some(text) => Log::status_line(&format!("Next alarm in {text}")),
            None => Log::status_line("No alarms pending"),
        }
    }

    fn show_ringing(&self, alarm: &Alarm) {
        log_block_start!("⏰ Your alarm is ringing! {}", alarm.clock());
        log_indented!("{}", alarm.date_label());
        log_indented!("Press 's' + Enter to snooze 5 minutes, 'd' + Enter to dismiss");
    }

    fn hide_ringing(&self) {
        log_decorated!("Alarm silenced");
    }

    fn show_toast(&self, message: &str, kind: ToastKind) {
        match kind {
            ToastKind::Info => log_info!("{message}"),
            ToastKind::Success => log_block_start!("{message}"),
            ToastKind::Error => log_error!("{message}"),
        }
    }
}
