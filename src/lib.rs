//! # tzalarm Library
//!
//! Internal library for the tzalarm binary application
//!
//! This library exists to enable testing of the alarm engine and provide clean
//! separation between CLI dispatch (main.rs) and application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `TzAlarm` wires configuration, lock, signals and collaborators
//! - **Core Logic**: Internal `core` module runs the one-second tick loop
//! - **Time**: `time` module for zone conversion and the real/simulated clock
//! - **Alarms**: `alarm` module with the store, scheduler and ringing lifecycle
//! - **Collaborators**: `ui` (rendering), `state` (persistence), `io` (sound,
//!   notifications, signals, lock file)
//! - **Configuration**: `config` module for TOML-based settings
//! - **Commands**: `commands` module for CLI subcommands (convert, set, list, ...)

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

// Public API modules
pub mod alarm;
pub mod args;
pub mod commands;
pub mod config;
pub mod io;
pub mod state;
pub mod time;
pub mod ui;

// Internal modules
mod core;
mod tzalarm;

pub use tzalarm::TzAlarm;
