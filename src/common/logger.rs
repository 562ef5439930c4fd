//! Structured logging with visual box-drawing output.
//!
//! All user-facing output of tzalarm goes through the macros defined here so
//! that it shares one visual style, can be silenced at runtime and can be
//! redirected to a file during simulations.
//!
//! ## Conventions
//!
//! - `log_block_start!` opens a new conceptual block (`┃` spacer, then `┣ message`).
//! - `log_decorated!` continues a block (`┣ message`).
//! - `log_indented!` lists details under a block line (`┃   message`).
//! - `log_pipe!` inserts a spacer line, typically before a semantic message.
//! - `log_version!` prints the startup header, `log_end!` the closing marker.
//! - `log_info!`, `log_warning!`, `log_error!`, `log_debug!` and `log_critical!`
//!   carry a `[LEVEL]` tag and are used when the level matters more than the
//!   block structure.
//!
//! The daemon keeps a live status line (the alarm countdown) at the bottom of
//! the terminal. Any regular log line first erases that status line so the
//! two never interleave.

use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{IsTerminal, Write};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// True while a status line without trailing newline is on screen
static STATUS_LINE_ACTIVE: AtomicBool = AtomicBool::new(false);

// Routes output to a file when simulation logging is active
static LOG_CHANNEL: OnceLock<Option<Sender<LogMessage>>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Runtime controls for the logging macros.
pub struct Log;

impl Log {
    /// Enable or disable all log output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Start writing log output to `file_path` instead of stdout.
    ///
    /// Output is handed to a writer thread; the returned guard flushes and
    /// joins it when dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(Some(tx.clone()))
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;
            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => file.write_all(text.as_bytes())?,
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }
            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix shown while the clock is simulated, empty otherwise.
    pub fn timestamp_prefix() -> String {
        if crate::time::source::is_initialized() && crate::time::source::is_simulated() {
            let now = crate::time::source::now().with_timezone(&chrono::Local);
            format!("[{}] ", now.format("%H:%M:%S"))
        } else {
            String::new()
        }
    }

    /// Emit one line: `lead` is the box-drawing/level decoration.
    pub fn emit(lead: &str, message: &str) {
        if !Self::is_enabled() {
            return;
        }
        let prefix = Self::timestamp_prefix();
        write_output(&format!("{prefix}{lead}{message}\n"));
    }

    /// Emit a spacer pipe followed by one line.
    pub fn emit_spaced(lead: &str, message: &str) {
        if !Self::is_enabled() {
            return;
        }
        let prefix = Self::timestamp_prefix();
        write_output(&format!("{prefix}┃\n{prefix}{lead}{message}\n"));
    }

    /// Draw `text` as the live status line, replacing the previous one.
    ///
    /// Only drawn on an interactive terminal with stdout logging; other
    /// sinks would accumulate one line per redraw.
    pub fn status_line(text: &str) {
        if !Self::is_enabled() || file_logging_active() || !std::io::stdout().is_terminal() {
            return;
        }
        let mut stdout = std::io::stdout();
        let _ = queue!(
            stdout,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(format!("┃ {text}"))
        );
        let _ = stdout.flush();
        STATUS_LINE_ACTIVE.store(true, Ordering::SeqCst);
    }

    /// Remove the live status line if one is drawn.
    pub fn clear_status_line() {
        if STATUS_LINE_ACTIVE.swap(false, Ordering::SeqCst) {
            let mut stdout = std::io::stdout();
            let _ = queue!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine));
            let _ = stdout.flush();
        }
    }
}

/// Guard for file logging; flushes and stops the writer thread on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        // LOG_CHANNEL stays set: OnceLock cannot be reset and the process exits afterwards
    }
}

fn file_logging_active() -> bool {
    matches!(LOG_CHANNEL.get(), Some(Some(_)))
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Route formatted output to the active sink. Public for macro access.
pub fn write_output(text: &str) {
    if let Some(Some(tx)) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        Log::clear_status_line();
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

// # Logging Macros

/// Format a log message from a literal format string or any `Display` value.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_message {
    ($fmt:literal $($arg:tt)*) => {
        format!($fmt $($arg)*)
    };
    ($expr:expr) => {
        format!("{}", $expr)
    };
}

/// Log a line that continues the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($msg:tt)+) => {
        $crate::common::logger::Log::emit("┣ ", &$crate::__log_message!($($msg)+))
    };
}

/// Log a detail line nested under the current block.
#[macro_export]
macro_rules! log_indented {
    ($($msg:tt)+) => {
        $crate::common::logger::Log::emit("┃   ", &$crate::__log_message!($($msg)+))
    };
}

/// Log an empty spacer line.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::common::logger::Log::emit("┃", "")
    };
}

/// Open a new block of related output.
#[macro_export]
macro_rules! log_block_start {
    ($($msg:tt)+) => {
        $crate::common::logger::Log::emit_spaced("┣ ", &$crate::__log_message!($($msg)+))
    };
}

/// Print the application header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::common::logger::Log::emit(
            "┏ ",
            &format!("tzalarm v{} ━━╸", env!("CARGO_PKG_VERSION")),
        )
    };
}

/// Print the closing marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::common::logger::Log::emit("╹", "")
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($msg:tt)+) => {
        $crate::common::logger::Log::emit(
            "┣[\x1b[33mWARNING\x1b[0m] ",
            &$crate::__log_message!($($msg)+),
        )
    };
}

#[macro_export]
macro_rules! log_error {
    ($($msg:tt)+) => {
        $crate::common::logger::Log::emit(
            "┣[\x1b[31mERROR\x1b[0m] ",
            &$crate::__log_message!($($msg)+),
        )
    };
}

/// Log an error that terminates the current flow (`┗` corner).
#[macro_export]
macro_rules! log_error_exit {
    ($($msg:tt)+) => {
        $crate::common::logger::Log::emit_spaced(
            "┗[\x1b[31mERROR\x1b[0m] ",
            &$crate::__log_message!($($msg)+),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($($msg:tt)+) => {
        $crate::common::logger::Log::emit(
            "┣[\x1b[32mINFO\x1b[0m] ",
            &$crate::__log_message!($($msg)+),
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($msg:tt)+) => {
        $crate::common::logger::Log::emit(
            "┣[\x1b[32mDEBUG\x1b[0m] ",
            &$crate::__log_message!($($msg)+),
        )
    };
}

#[macro_export]
macro_rules! log_critical {
    ($($msg:tt)+) => {
        $crate::common::logger::Log::emit(
            "┣[\x1b[31mCRITICAL\x1b[0m] ",
            &$crate::__log_message!($($msg)+),
        )
    };
}
