use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during settings management.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file exists but is not valid settings JSON.
    #[error("Invalid settings in {path}: {message}")]
    InvalidSettings { path: PathBuf, message: String },
    /// Settings could not be serialised.
    #[error("Failed to serialise settings: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Delay or typing speed is negative, zero where not allowed, or not a number.
    #[error("Specify a valid number.")]
    InvalidNumber(f64),
    /// Backup directory cannot be created or written to.
    #[error("Backup directory not writable: {0}")]
    BackupDirNotWritable(PathBuf),
    /// Failed to create or restore a backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
