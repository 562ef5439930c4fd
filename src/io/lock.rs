//! Lock file management for single-instance enforcement.
//!
//! The daemon holds an exclusive `fs2` lock on a file in the runtime
//! directory for as long as it runs. The file also records the daemon's PID
//! so other tzalarm processes can signal it.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// An exclusively locked file, unlocked when dropped.
#[derive(Debug)]
pub struct LockFile {
    pub(crate) file: File,
}

impl LockFile {
    /// Try to take the lock without blocking.
    ///
    /// Returns `Ok(None)` when another process holds it.
    pub fn try_acquire(path: &Path) -> Result<Option<Self>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create lock directory {}", parent.display()))?;
        }

        // Open without truncating so a held lock's contents stay readable
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file })),
            Err(_) => Ok(None),
        }
    }

    /// Replace the file contents.
    pub fn write(&mut self, contents: &str) -> Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(contents.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn runtime_dir() -> PathBuf {
    std::env::var("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// Lock file held by the running daemon.
pub fn get_main_lock_path() -> PathBuf {
    runtime_dir().join("tzalarm.lock")
}
