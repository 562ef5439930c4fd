//! Presentation of conversions, alarms and the ringing state.
//!
//! The alarm engine only talks to an [`AlarmView`]; what the user sees is up
//! to the implementation. [`terminal::TerminalView`] draws with the logging
//! macros and keeps the countdown on a live status line.

pub mod terminal;

use crate::alarm::Alarm;
use crate::time::convert::{ConversionError, ConvertedTime};

pub use terminal::TerminalView;

/// Severity of a transient message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// Everything the engine asks the user interface to show.
pub trait AlarmView: Send + Sync {
    fn render_conversion(&self, result: &Result<ConvertedTime, ConversionError>);

    /// Show the full alarm collection, in store order.
    fn render_alarm_list(&self, alarms: &[Alarm]);

    /// Show the time left until the next alarm, or that none is pending.
    fn render_countdown(&self, countdown: Option<&str>);

    fn show_ringing(&self, alarm: &Alarm);

    fn hide_ringing(&self);

    fn show_toast(&self, message: &str, kind: ToastKind);
}
