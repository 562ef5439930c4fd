//! The daemon's main loop.
//!
//! `Core` owns the [`AlarmEngine`] and drives it with a fixed one-second
//! tick. Between ticks it waits on the signal channel, so keyboard commands
//! and reload requests are handled promptly without starting an extra tick.
//! A tick always runs to completion before the next message is looked at.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Instant;

use crate::{
    alarm::engine::AlarmEngine,
    common::constants::TICK_INTERVAL,
    common::logger::Log,
    io::instance,
    io::lock::LockFile,
    io::signals::{SignalState, handle_signal_message},
    time::source::TimeSource,
};

/// Parameters for creating a Core instance.
pub(crate) struct CoreParams {
    pub engine: AlarmEngine,
    pub signal_state: SignalState,
    pub clock: Arc<dyn TimeSource>,
    pub debug_enabled: bool,
    pub lock_info: Option<(LockFile, PathBuf)>,
}

pub(crate) struct Core {
    engine: AlarmEngine,
    signal_state: SignalState,
    clock: Arc<dyn TimeSource>,
    debug_enabled: bool,
    lock_info: Option<(LockFile, PathBuf)>,
}

impl Core {
    pub fn new(params: CoreParams) -> Self {
        Self {
            engine: params.engine,
            signal_state: params.signal_state,
            clock: params.clock,
            debug_enabled: params.debug_enabled,
            lock_info: params.lock_info,
        }
    }

    /// Run until shutdown is requested or a simulation reaches its end.
    pub fn execute(mut self) -> Result<()> {
        let pending = self
            .engine
            .store()
            .alarms()
            .iter()
            .filter(|alarm| alarm.is_active)
            .count();
        log_block_start!(
            "Watching {} alarm{} (trigger policy: {})",
            pending,
            if pending == 1 { "" } else { "s" },
            self.engine.policy().as_str()
        );
        if let Some(next) = self.engine.store().next_due(self.clock.now()) {
            log_indented!("Next: {} {}", next.clock(), next.date_label());
        }

        let result = self.main_loop();

        Log::clear_status_line();
        // Stops a ringing alarm's sound
        self.engine.dismiss();

        if let Some((lock, _path)) = self.lock_info.take() {
            instance::release(lock);
        }

        result
    }

    /// Main tick loop.
    fn main_loop(&mut self) -> Result<()> {
        while self.signal_state.is_running() {
            if self.clock.is_ended() {
                Log::clear_status_line();
                log_block_start!("Simulation reached its end time");
                break;
            }

            let report = self.engine.tick();
            if self.debug_enabled && report.pruned > 0 {
                log_debug!("Pruned {} expired alarm(s)", report.pruned);
            }

            if self.clock.is_simulated() {
                self.wait_simulated();
            } else {
                self.wait_real();
            }
        }

        Ok(())
    }

    /// Let the simulated clock advance one tick, then handle what arrived.
    fn wait_simulated(&mut self) {
        self.clock.sleep(TICK_INTERVAL);
        while let Ok(signal_msg) = self.signal_state.signal_receiver.try_recv() {
            handle_signal_message(signal_msg, &mut self.engine, &self.signal_state);
        }
    }

    /// Wait for the next tick, handling messages as they arrive.
    fn wait_real(&mut self) {
        let deadline = Instant::now() + TICK_INTERVAL;

        while self.signal_state.is_running() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            match self.signal_state.signal_receiver.recv_timeout(remaining) {
                Ok(signal_msg) => {
                    handle_signal_message(signal_msg, &mut self.engine, &self.signal_state);
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    // No producers left; keep ticking on plain sleeps
                    std::thread::sleep(remaining);
                    break;
                }
            }
        }
    }
}
