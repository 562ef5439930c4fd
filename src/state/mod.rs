//! Persistent state for tzalarm, following XDG Base Directory standards.
//!
//! Alarms and settings are small JSON blobs addressed by key. The daemon and
//! the CLI reach them through the [`KeyValueStore`] trait so the alarm engine
//! never touches the filesystem directly. [`FileStore`] keeps one file per key
//! in XDG_STATE_HOME; [`MemoryStore`] backs tests and simulations.

pub mod settings;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::config::get_custom_config_dir;

/// String blob storage keyed by name.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, `None` when nothing was stored yet.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Get the state directory for a given configuration directory.
///
/// State is stored in XDG_STATE_HOME/tzalarm/{namespace} where namespace is:
/// - "default" for the default config directory
/// - "custom_<hash>" for custom config directories (via --config)
pub fn get_state_dir(config_dir: Option<&Path>) -> Result<PathBuf> {
    let state_home = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });

    let state_base = state_home.join("tzalarm");

    let namespace = match config_dir {
        None => "default".to_string(),
        Some(path) => {
            let default_config = dirs::config_dir()
                .context("Could not determine config directory")?
                .join("tzalarm");
            if path == default_config {
                "default".to_string()
            } else {
                get_state_namespace(path)
            }
        }
    };

    Ok(state_base.join(namespace))
}

/// Generate a stable namespace for a custom config directory.
fn get_state_namespace(config_path: &Path) -> String {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());

    // SHA256 truncated to 16 chars
    let hash = sha256::digest(canonical.to_string_lossy().as_bytes());
    format!("custom_{}", &hash[..16])
}

/// One JSON file per key inside a state directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Store rooted at the state directory of the active config directory.
    pub fn open_default() -> Result<Self> {
        let config_dir = get_custom_config_dir();
        Ok(Self::new(get_state_dir(config_dir.as_deref())?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read state file {}", path.display()))
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create state directory {}", self.dir.display())
        })?;

        // Write to a sibling temp file and rename so readers never see a partial blob
        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)
            .context("Failed to create temporary state file")?;
        temp.write_all(value.as_bytes())
            .context("Failed to write temporary state file")?;

        let path = self.path_for(key);
        temp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write state file {}", path.display()))?;
        Ok(())
    }
}

/// Volatile store used by tests and simulations.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` with `value`.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
