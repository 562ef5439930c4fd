//! User toggles for how a ringing alarm is announced.

use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::common::constants::SETTINGS_KEY;

/// Persisted `{notifications, sound}` toggles.
///
/// Missing fields in a stored blob take their defaults, so older or partial
/// blobs merge over [`Settings::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub notifications: bool,
    pub sound: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: false,
            sound: true,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when absent or unreadable.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(settings) => settings,
                Err(e) => {
                    log_warning!("Stored settings are invalid, using defaults: {e}");
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                log_warning!("Could not read settings, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Write settings through; failures are logged, not propagated.
    pub fn save(&self, store: &dyn KeyValueStore) {
        let blob = match serde_json::to_string(self) {
            Ok(blob) => blob,
            Err(e) => {
                log_warning!("Could not encode settings: {e}");
                return;
            }
        };
        if let Err(e) = store.set(SETTINGS_KEY, &blob) {
            log_warning!("Could not save settings: {e}");
        }
    }
}
