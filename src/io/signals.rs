//! Signal handling for the tzalarm daemon.
//!
//! Unix signals are turned into [`SignalMessage`]s on a dedicated thread and
//! delivered to the main loop over the same channel the keyboard thread uses,
//! so the loop has a single place to wait for outside events.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

use crate::alarm::engine::AlarmEngine;

/// Events delivered to the main loop from helper threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalMessage {
    /// Persisted alarms or settings changed (SIGUSR2)
    Reload,
    /// Stop the daemon (SIGTERM, SIGINT, SIGHUP, or `q` from the keyboard)
    Shutdown,
    /// Snooze the ringing alarm
    Snooze,
    /// Dismiss the ringing alarm
    Dismiss,
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Cleared once shutdown was requested
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Handed to other producers such as the keyboard thread
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// A channel with no OS signal thread attached, for simulations and tests.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Register signal handlers and start the thread that forwards them.
pub fn setup_signal_handler() -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = state.running.clone();
    let signal_sender_clone = state.signal_sender.clone();

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                match sig {
                    SIGUSR2 => {
                        if signal_sender_clone.send(SignalMessage::Reload).is_err() {
                            break;
                        }
                    }
                    SIGHUP => {
                        // Terminal is gone; logging would fail
                        running_clone.store(false, Ordering::SeqCst);
                        let _ = signal_sender_clone.send(SignalMessage::Shutdown);
                        break;
                    }
                    _ => {
                        log_pipe!();
                        log_info!(
                            "{}",
                            match sig {
                                SIGINT => "Received interrupt signal, shutting down...",
                                _ => "Received termination request, shutting down...",
                            }
                        );
                        running_clone.store(false, Ordering::SeqCst);
                        if signal_sender_clone.send(SignalMessage::Shutdown).is_err() {
                            break;
                        }
                    }
                }
            }
        })
        .context("failed to start signal thread")?;

    Ok(state)
}

/// Apply one message to the engine.
pub fn handle_signal_message(
    signal_msg: SignalMessage,
    engine: &mut AlarmEngine,
    signal_state: &SignalState,
) {
    match signal_msg {
        SignalMessage::Reload => {
            log_pipe!();
            log_info!("Alarms changed, reloading");
            engine.reload();
        }
        SignalMessage::Shutdown => {
            signal_state.running.store(false, Ordering::SeqCst);
        }
        SignalMessage::Snooze => {
            if engine.ringing().is_none() {
                log_indented!("No alarm is ringing");
            } else {
                engine.snooze();
            }
        }
        SignalMessage::Dismiss => {
            if engine.dismiss().is_none() {
                log_indented!("No alarm is ringing");
            }
        }
    }
}
