//! Settings file management with atomic writes and backup support.
//!
//! This module provides safe, transactional operations for the chord
//! settings file. Key features:
//!
//! - **Defaults on first run**: a missing settings file loads as defaults
//! - **Atomic writes**: Uses temp-file-then-rename to prevent corruption
//! - **Automatic backups**: Every write backs up the previous file first
//! - **Bounded history**: Backups beyond the retention count are pruned
//! - **Symlink warnings**: Logged, but symlinked settings are allowed
//!
//! # Example
//!
//! ```no_run
//! use chords::config::{SettingsManager, SettingsStore};
//!
//! let manager = SettingsManager::new("/home/user/.config/chords/settings.json".into())?;
//!
//! let mut settings = manager.load()?;
//! settings.set_delay_manually = true;
//! manager.save(&settings)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod settings;
pub mod transaction;

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use error::ConfigError;
pub use settings::Settings;
pub use transaction::SettingsTransaction;

/// Number of backups kept after each save
pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// Backup suffix, `YYYY-MM-DD_HHMMSS`
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";
const BACKUP_TIMESTAMP_LEN: usize = 17;

/// Sort key for the part of a backup name after `settings.json.`
///
/// Timestamps compare as text; the same-second counter compares as a number
/// so `_10` lands after `_9`.
fn backup_order(stamp: &str) -> (String, u64) {
    match stamp.get(..BACKUP_TIMESTAMP_LEN) {
        Some(timestamp) => {
            let counter = stamp[BACKUP_TIMESTAMP_LEN..]
                .strip_prefix('_')
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            (timestamp.to_string(), counter)
        }
        None => (stamp.to_string(), 0),
    }
}

/// Persistence seam used by the chord manager
///
/// Called after every logical change. A failure is reported to the caller;
/// in-memory state is not rolled back.
pub trait SettingsStore {
    fn save(&self, settings: &Settings) -> Result<(), ConfigError>;
}

/// Manages the chord settings file with safe atomic operations.
///
/// All writes go through [`SettingsTransaction`] so the previous file is
/// backed up before it is replaced.
#[derive(Debug)]
pub struct SettingsManager {
    /// Path to the settings JSON file.
    settings_path: PathBuf,
    backup_dir: PathBuf,
    max_backups: usize,
}

impl SettingsManager {
    /// Creates a new SettingsManager for the given settings file.
    ///
    /// The settings file does not need to exist yet. Its parent directory
    /// and a `backups` directory next to it are created when missing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::BackupDirNotWritable` if the backup directory
    /// cannot be created or is read-only.
    pub fn new(settings_path: PathBuf) -> Result<Self, ConfigError> {
        // Warn if settings are a symlink (but allow it)
        if settings_path.read_link().is_ok() {
            warn!(path = %settings_path.display(), "settings file is a symlink");
        }

        // e.g., ~/.config/chords/settings.json → ~/.config/chords/backups/
        let backup_dir = settings_path
            .parent()
            .ok_or_else(|| {
                ConfigError::BackupDirNotWritable(PathBuf::from(
                    "Settings file has no parent directory",
                ))
            })?
            .join("backups");

        if !backup_dir.exists() {
            fs::create_dir_all(&backup_dir)
                .map_err(|_| ConfigError::BackupDirNotWritable(backup_dir.clone()))?;
        }

        if backup_dir.metadata()?.permissions().readonly() {
            return Err(ConfigError::BackupDirNotWritable(backup_dir));
        }

        Ok(Self {
            settings_path,
            backup_dir,
            max_backups: DEFAULT_MAX_BACKUPS,
        })
    }

    /// Changes how many backups survive each save
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Reads the settings file, or defaults if there is none yet.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSettings` if the file is not valid JSON
    /// for [`Settings`], `ConfigError::Io` if it cannot be read.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        if !self.settings_path.exists() {
            debug!(path = %self.settings_path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.settings_path)?;
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidSettings {
            path: self.settings_path.clone(),
            message: e.to_string(),
        })
    }

    /// Starts a transaction, backing up the current file
    pub fn begin_transaction(&self) -> Result<SettingsTransaction<'_>, ConfigError> {
        SettingsTransaction::begin(self)
    }

    /// Lists backups of the settings file, oldest first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let prefix = format!("{}.", self.file_name()?);

        let mut backups: Vec<PathBuf> = fs::read_dir(&self.backup_dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(&prefix))
                    .unwrap_or(false)
            })
            .collect();

        backups.sort_by_cached_key(|path| {
            let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
            backup_order(name.get(prefix.len()..).unwrap_or_default())
        });
        Ok(backups)
    }

    /// Deletes the oldest backups so at most `keep` remain.
    ///
    /// Returns how many were deleted.
    pub fn prune_backups(&self, keep: usize) -> Result<usize, ConfigError> {
        let backups = self.list_backups()?;
        let excess = backups.len().saturating_sub(keep);

        for path in &backups[..excess] {
            fs::remove_file(path)?;
            debug!(path = %path.display(), "pruned old settings backup");
        }

        Ok(excess)
    }

    /// Copies the current settings file into the backup directory.
    ///
    /// Returns `None` when there is no settings file to back up yet.
    pub(crate) fn create_timestamped_backup(&self) -> Result<Option<PathBuf>, ConfigError> {
        if !self.settings_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.settings_path)?;

        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let base = format!("{}.{}", self.file_name()?, timestamp);

        // Several saves within one second get numbered backups
        let mut backup_path = self.backup_dir.join(&base);
        let mut counter = 1;
        while backup_path.exists() {
            backup_path = self.backup_dir.join(format!("{}_{}", base, counter));
            counter += 1;
        }

        fs::write(&backup_path, &content)
            .map_err(|e| ConfigError::BackupFailed(format!("{}: {}", backup_path.display(), e)))?;

        Ok(Some(backup_path))
    }

    fn file_name(&self) -> Result<&str, ConfigError> {
        self.settings_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ConfigError::BackupFailed(format!(
                    "settings path has no UTF-8 file name: {}",
                    self.settings_path.display()
                ))
            })
    }
}

impl SettingsStore for SettingsManager {
    /// Writes settings atomically, then prunes old backups.
    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(settings)?;

        self.begin_transaction()?.commit(&json)?;
        let pruned = self.prune_backups(self.max_backups)?;

        info!(
            path = %self.settings_path.display(),
            chords = settings.chords.len(),
            pruned,
            "settings saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests;
