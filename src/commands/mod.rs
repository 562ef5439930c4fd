//! Command-line command handlers for tzalarm.
//!
//! Each one-shot command lives in its own submodule. Commands that change
//! alarms or settings write them to the state directory and then ask a
//! running daemon to reload.

pub mod alarm;
pub mod convert;
pub mod help;
pub mod settings;
pub mod simulate;
pub mod stop;
pub mod zones;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::alarm::store::AlarmStore;
use crate::io::instance;
use crate::state::{FileStore, KeyValueStore};
use crate::time::source;
use crate::ui::TerminalView;

/// Open the persisted state for the active configuration directory.
pub(crate) fn open_persistence() -> Result<Arc<dyn KeyValueStore>> {
    let store = FileStore::open_default().context("Failed to open state directory")?;
    Ok(Arc::new(store))
}

/// Load the persisted alarms for a one-shot command.
///
/// Past alarms inside the grace window are kept so a running daemon's due
/// or ringing alarm is written back untouched. The view does not re-print the list after each change; commands print
/// their own summary.
pub(crate) fn open_alarm_store() -> Result<AlarmStore> {
    Ok(AlarmStore::open(
        open_persistence()?,
        Arc::new(TerminalView::without_list()),
        source::current(),
    ))
}

/// Tell a running daemon that persisted state changed and say so.
pub(crate) fn notify_daemon(debug_enabled: bool) {
    if instance::notify_running_instance() {
        log_indented!("Running tzalarm notified");
    } else if debug_enabled {
        log_pipe!();
        log_debug!("No running tzalarm to notify");
    }
}
