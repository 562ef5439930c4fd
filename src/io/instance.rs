//! High-level instance management for tzalarm processes.
//!
//! The foreground daemon (`tzalarm run`) is the only process that rings
//! alarms. CLI commands that change alarms or settings write them to the
//! state directory and then use this module to find the daemon through its
//! lock file and tell it to reload (SIGUSR2) or stop (SIGTERM).

use anyhow::{Context, Result};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};

use crate::io::lock::{self, LockFile};

/// Information about a running tzalarm daemon.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceInfo {
    pub pid: u32,
    /// Custom config directory if set
    pub config_dir: Option<PathBuf>,
}

impl InstanceInfo {
    /// Parse instance info from lock file contents.
    ///
    /// Lock file format:
    /// - Line 1: PID
    /// - Line 2: Config directory (optional, empty if default)
    pub fn from_lock_contents(contents: &str) -> Result<Self> {
        let lines: Vec<&str> = contents.trim_end_matches('\n').lines().collect();

        if lines.is_empty() || lines[0].trim().is_empty() {
            anyhow::bail!("Lock file is empty");
        }

        if lines.len() > 2 {
            anyhow::bail!("Invalid lock file format (expected 1-2 lines)");
        }

        let pid = lines[0]
            .trim()
            .parse::<u32>()
            .context("Invalid PID format in lock file")?;

        let config_dir = lines
            .get(1)
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(PathBuf::from);

        Ok(InstanceInfo { pid, config_dir })
    }

    /// Serialize instance info to lock file format.
    pub fn to_lock_contents(&self) -> String {
        match self.config_dir {
            Some(ref config_dir) => format!("{}\n{}\n", self.pid, config_dir.display()),
            None => format!("{}\n\n", self.pid),
        }
    }
}

/// Get information about the running daemon, if one is alive.
pub fn get_running_instance() -> Result<Option<InstanceInfo>> {
    read_instance(&lock::get_main_lock_path())
}

fn read_instance(lock_path: &Path) -> Result<Option<InstanceInfo>> {
    let lock_content = match std::fs::read_to_string(lock_path) {
        Ok(content) => content,
        Err(_) => return Ok(None),
    };

    // An unlocked, emptied file is left behind after a clean exit
    if lock_content.trim().is_empty() {
        return Ok(None);
    }

    let info = InstanceInfo::from_lock_contents(&lock_content)?;
    if is_instance_running(info.pid) {
        Ok(Some(info))
    } else {
        Ok(None)
    }
}

/// Check if a process with the given PID is still running.
pub fn is_instance_running(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// Terminate a tzalarm daemon by sending SIGTERM.
pub fn terminate_instance(pid: u32) -> Result<()> {
    kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        .map_err(|e| anyhow::anyhow!("Failed to send SIGTERM to process: {}", e))
}

/// Send a reload signal (SIGUSR2) to a running daemon.
pub fn send_reload_signal(pid: u32) -> Result<()> {
    kill(Pid::from_raw(pid as i32), Signal::SIGUSR2)
        .map_err(|e| anyhow::anyhow!("Failed to send reload signal: {}", e))
}

/// Tell a running daemon that persisted state changed.
///
/// Returns whether a daemon was notified. Without a daemon there is nothing
/// to do: the next `tzalarm run` loads the new state.
pub fn notify_running_instance() -> bool {
    match get_running_instance() {
        Ok(Some(info)) if info.pid != std::process::id() => {
            match send_reload_signal(info.pid) {
                Ok(()) => true,
                Err(e) => {
                    log_warning!("Could not notify running tzalarm (PID: {}): {e}", info.pid);
                    false
                }
            }
        }
        _ => false,
    }
}

/// Take the daemon lock and record this process in it.
///
/// Fails when another live daemon holds the lock. A lock left by a dead
/// process is taken over.
pub fn ensure_single_instance() -> Result<(LockFile, PathBuf)> {
    let lock_path = lock::get_main_lock_path();

    let mut lock = match LockFile::try_acquire(&lock_path)? {
        Some(lock) => lock,
        None => {
            handle_instance_conflict(&lock_path)?;
            LockFile::try_acquire(&lock_path)?.ok_or_else(|| {
                anyhow::anyhow!("Failed to acquire lock after conflict resolution")
            })?
        }
    };

    let info = InstanceInfo {
        pid: std::process::id(),
        config_dir: crate::config::get_custom_config_dir(),
    };
    lock.write(&info.to_lock_contents())?;

    Ok((lock, lock_path))
}

/// Handle a held lock: clean up after a dead owner, refuse a live one.
pub fn handle_instance_conflict(lock_path: &Path) -> Result<()> {
    let lock_content = match std::fs::read_to_string(lock_path) {
        Ok(content) => content,
        Err(_) => return Ok(()),
    };

    let info = match InstanceInfo::from_lock_contents(&lock_content) {
        Ok(info) => info,
        Err(_) => {
            log_warning!("Lock file format invalid, removing");
            let _ = std::fs::remove_file(lock_path);
            return Ok(());
        }
    };

    if !is_instance_running(info.pid) {
        log_warning!(
            "Removing stale lock file (process {} no longer running)",
            info.pid
        );
        let _ = std::fs::remove_file(lock_path);
        return Ok(());
    }

    log_pipe!();
    log_error!("tzalarm is already running (PID: {})", info.pid);
    log_block_start!("Did you mean to:");
    log_indented!("• Add an alarm: tzalarm set <date> <time>");
    log_indented!("• See alarms: tzalarm list");
    log_indented!("• Stop it: tzalarm stop");
    anyhow::bail!("Cannot start - another tzalarm instance is running")
}

/// Clear the recorded PID before releasing the lock on exit.
pub fn release(mut lock: LockFile) {
    let _ = lock.write("");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_instance_info_from_lock_contents() {
        let info = InstanceInfo::from_lock_contents("12345\n/home/user/.config/tzalarm\n").unwrap();
        assert_eq!(info.pid, 12345);
        assert_eq!(
            info.config_dir,
            Some(PathBuf::from("/home/user/.config/tzalarm"))
        );

        let info = InstanceInfo::from_lock_contents("67890\n\n").unwrap();
        assert_eq!(info.pid, 67890);
        assert_eq!(info.config_dir, None);

        let info = InstanceInfo::from_lock_contents("11111").unwrap();
        assert_eq!(info.pid, 11111);
        assert_eq!(info.config_dir, None);
    }

    #[test]
    fn test_instance_info_from_lock_contents_errors() {
        assert!(InstanceInfo::from_lock_contents("").is_err());
        assert!(InstanceInfo::from_lock_contents("not_a_pid\n").is_err());
        assert!(InstanceInfo::from_lock_contents("12345\n/config\nextra_line").is_err());
    }

    #[test]
    fn test_instance_info_round_trip() {
        for original in [
            InstanceInfo {
                pid: 99999,
                config_dir: Some(PathBuf::from("/custom/config")),
            },
            InstanceInfo {
                pid: 1,
                config_dir: None,
            },
        ] {
            let parsed = InstanceInfo::from_lock_contents(&original.to_lock_contents()).unwrap();
            assert_eq!(parsed, original);
        }
    }

    #[test]
    fn test_is_instance_running() {
        assert!(is_instance_running(std::process::id()));
        assert!(!is_instance_running(999999999));
    }

    #[test]
    fn test_read_instance_ignores_dead_and_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tzalarm.lock");

        assert_eq!(read_instance(&path).unwrap(), None);

        fs::write(&path, "").unwrap();
        assert_eq!(read_instance(&path).unwrap(), None);

        fs::write(&path, "999999999\n\n").unwrap();
        assert_eq!(read_instance(&path).unwrap(), None);

        fs::write(&path, format!("{}\n\n", std::process::id())).unwrap();
        assert_eq!(
            read_instance(&path).unwrap().map(|info| info.pid),
            Some(std::process::id())
        );
    }

    #[test]
    fn test_conflict_with_stale_lock_is_cleaned_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tzalarm.lock");
        fs::write(&path, "999999999\n\n").unwrap();

        handle_instance_conflict(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_conflict_with_live_owner_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tzalarm.lock");
        fs::write(&path, format!("{}\n\n", std::process::id())).unwrap();

        assert!(handle_instance_conflict(&path).is_err());
        assert!(path.exists());
    }
}
