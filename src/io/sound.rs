//! Alarm sound: a single beep primitive and the loop that repeats it.
//!
//! While an alarm rings, a [`SoundLoop`] owns a background thread that
//! beeps once per [`BEEP_INTERVAL`]. The loop is the only periodic task
//! besides the scheduler tick; it stops when dismissed, snoozed or dropped.

use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::sync::mpsc::{RecvTimeoutError, Sender, channel};
use std::thread::JoinHandle;

use super::CapabilityError;
use crate::common::constants::BEEP_INTERVAL;

/// Something that can make a short alarm tone.
#[cfg_attr(test, mockall::automock)]
pub trait Sound: Send + Sync {
    /// Play one tone of roughly `duration_ms` milliseconds.
    fn beep(&self, duration_ms: u64) -> Result<(), CapabilityError>;
}

/// Rings the terminal bell.
///
/// The bell has no adjustable length, so the duration is ignored. Nothing is
/// written when stdout is not a terminal.
pub struct TerminalBell;

impl Sound for TerminalBell {
    fn beep(&self, _duration_ms: u64) -> Result<(), CapabilityError> {
        let mut stdout = std::io::stdout();
        if !stdout.is_terminal() {
            return Ok(());
        }
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(|e| CapabilityError::Unsupported(format!("terminal bell: {e}")))
    }
}

/// A running alarm sound.
pub struct SoundLoop {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SoundLoop {
    /// Beep immediately, then once per interval until stopped.
    pub fn start(sound: Arc<dyn Sound>, duration_ms: u64) -> Self {
        if let Err(e) = sound.beep(duration_ms) {
            log_warning!("Alarm sound unavailable: {e}");
            return Self {
                stop_tx: None,
                handle: None,
            };
        }

        let (stop_tx, stop_rx) = channel::<()>();
        let spawned = std::thread::Builder::new()
            .name("alarm-sound".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(BEEP_INTERVAL) {
                        Err(RecvTimeoutError::Timeout) => {
                            if sound.beep(duration_ms).is_err() {
                                break;
                            }
                        }
                        // Stop requested or owner gone
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match spawned {
            Ok(handle) => Self {
                stop_tx: Some(stop_tx),
                handle: Some(handle),
            },
            Err(e) => {
                log_warning!("Failed to start alarm sound thread: {e}");
                Self {
                    stop_tx: None,
                    handle: None,
                }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop beeping and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SoundLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
