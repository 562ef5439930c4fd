// External I/O operations module
pub mod input; // Keyboard commands for a ringing alarm
pub mod instance; // High-level instance management
pub mod lock; // Low-level lock file operations
pub mod notify; // Desktop notifications
pub mod signals; // Unix signal handling
pub mod sound; // Alarm sound loop

/// A platform capability (sound, notifications) is not available.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityError {
    Unsupported(String),
}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityError::Unsupported(reason) => write!(f, "Capability unavailable: {reason}"),
        }
    }
}

impl std::error::Error for CapabilityError {}
