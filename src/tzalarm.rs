//! Application coordinator that manages the lifecycle of the tzalarm daemon.
//!
//! This module acquires resources, wires the collaborators together and hands
//! control to the main loop. It manages:
//! - Configuration loading
//! - Lock file management for single-instance enforcement
//! - Signal and keyboard input setup
//! - Persistence, notification and sound collaborators
//!
//! The `TzAlarm` struct uses a builder pattern to support different startup contexts:
//! - Normal startup: `TzAlarm::new(debug_enabled).run()`
//! - Simulation mode: `TzAlarm::new(debug_enabled).without_lock().without_headers()
//!   .with_clock(clock).with_persistence(store).run()`

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::sync::Arc;

use crate::{
    alarm::engine::{AlarmEngine, EngineParts},
    config,
    core::{Core, CoreParams},
    io::input::spawn_input_thread,
    io::instance,
    io::notify::DesktopNotifier,
    io::signals::setup_signal_handler,
    io::sound::TerminalBell,
    state::{FileStore, KeyValueStore},
    time::source::{self, TimeSource},
    ui::TerminalView,
};

/// Builder for configuring and running the tzalarm daemon.
///
/// # Examples
///
/// ```no_run
/// use tzalarm::TzAlarm;
///
/// # fn main() -> anyhow::Result<()> {
/// // Normal foreground daemon
/// TzAlarm::new(false).run()?;
///
/// // Without a lock or version header
/// TzAlarm::new(true).without_lock().without_headers().run()?;
/// # Ok(())
/// # }
/// ```
pub struct TzAlarm {
    debug_enabled: bool,
    create_lock: bool,
    show_headers: bool,
    clock: Option<Arc<dyn TimeSource>>,
    persistence: Option<Arc<dyn KeyValueStore>>,
}

impl TzAlarm {
    /// Create a new runner with defaults matching a normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            create_lock: true,
            show_headers: true,
            clock: None,
            persistence: None,
        }
    }

    /// Skip lock file creation (for simulations)
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    /// Skip the version header
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Drive the daemon from `clock` instead of the process-wide time source
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Keep alarms and settings in `persistence` instead of the state directory
    pub fn with_persistence(mut self, persistence: Arc<dyn KeyValueStore>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Run the daemon until shutdown.
    ///
    /// Loads the configuration, takes the lock (if enabled), starts the
    /// signal and keyboard threads, then runs the main loop. The lock is
    /// released and any ringing alarm is silenced on the way out.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }

        let config = match config::load() {
            Ok(config) => config,
            Err(e) => {
                log_error_exit!("Configuration failed");
                eprintln!("{:?}", e);
                std::process::exit(1);
            }
        };

        // Take the lock before any other output so a refused start stays short
        let lock_info = if self.create_lock {
            Some(instance::ensure_single_instance()?)
        } else {
            None
        };

        let signal_state = setup_signal_handler()?;

        let interactive = std::io::stdin().is_terminal();
        if interactive {
            spawn_input_thread(signal_state.signal_sender.clone());
        }

        config.log_config();

        let persistence: Arc<dyn KeyValueStore> = match self.persistence {
            Some(persistence) => persistence,
            None => Arc::new(FileStore::open_default().context("Failed to open state directory")?),
        };
        let clock = self.clock.unwrap_or_else(source::current);

        if self.debug_enabled {
            log_pipe!();
            log_debug!(
                "Process {} startup: create_lock={}, simulated={}",
                std::process::id(),
                self.create_lock,
                clock.is_simulated()
            );
        }

        let engine = AlarmEngine::new(EngineParts {
            persistence,
            view: Arc::new(TerminalView::new()),
            notifier: Arc::new(DesktopNotifier::connect()),
            sound: Arc::new(TerminalBell),
            clock: clock.clone(),
            policy: config.policy(),
            beep_duration_ms: config.beep_duration_ms(),
        });

        if lock_info.is_some() {
            log_block_start!("Lock acquired, starting tzalarm...");
        }
        if interactive {
            log_indented!("Keys: s = snooze, d = dismiss, q = quit (then Enter)");
        }

        let core = Core::new(CoreParams {
            engine,
            signal_state,
            clock,
            debug_enabled: self.debug_enabled,
            lock_info,
        });

        core.execute()
    }
}
