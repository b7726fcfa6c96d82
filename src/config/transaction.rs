// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Settings transaction management with automatic backups
//!
//! Provides atomic write operations for the settings file.

use atomic_write_file::AtomicWriteFile;
use std::{fs, io::Write, path::Path, path::PathBuf};
use tracing::info;

use crate::config::{ConfigError, SettingsManager};

/// Atomic settings transaction with automatic backup.
///
/// # Lifecycle
///
/// 1. `begin()` - Backs up the current settings file immediately
/// 2. Caller serialises the new settings (in memory)
/// 3. `commit()` - Writes atomically, or `rollback()` - Restores the backup
///
/// # Example
///
/// ```no_run
/// use chords::config::{SettingsManager, SettingsTransaction};
/// use std::path::PathBuf;
///
/// let manager = SettingsManager::new(PathBuf::from("settings.json"))?;
/// let tx = SettingsTransaction::begin(&manager)?;
///
/// match tx.commit("{\"delay\": 30.0}") {
///     Ok(()) => println!("Settings written"),
///     Err(e) => eprintln!("Commit failed: {}", e),
/// }
/// # Ok::<(), chords::config::ConfigError>(())
/// ```
pub struct SettingsTransaction<'a> {
    manager: &'a SettingsManager,
    /// `None` when there was no settings file to back up
    backup_path: Option<PathBuf>,
}

impl<'a> SettingsTransaction<'a> {
    /// Begins a new transaction by creating a timestamped backup.
    ///
    /// The transaction cannot outlive the manager (enforced by `'a`).
    ///
    /// # Errors
    ///
    /// Returns an error if the current settings cannot be read or the
    /// backup cannot be written. Nothing has been modified in that case.
    pub fn begin(manager: &'a SettingsManager) -> Result<Self, ConfigError> {
        // Create backup immediately - this is our rollback point
        let backup_path = manager.create_timestamped_backup()?;

        Ok(Self {
            manager,
            backup_path,
        })
    }

    /// Backup written by `begin()`, if there was anything to back up
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Commits the transaction by atomically replacing the settings file.
    ///
    /// Consumes the transaction, preventing accidental double-commits. On
    /// error the previous file is untouched and the backup is kept.
    pub fn commit(self, new_content: &str) -> Result<(), ConfigError> {
        write_atomically(self.manager.settings_path(), new_content)
    }

    /// Rolls back to the state when the transaction began.
    ///
    /// With a backup, its content is atomically written back. Without one
    /// there was no settings file, so any file written since is removed.
    pub fn rollback(&self) -> Result<(), ConfigError> {
        let settings_path = self.manager.settings_path();

        match &self.backup_path {
            Some(backup_path) => {
                let backup_content = fs::read_to_string(backup_path).map_err(|e| {
                    ConfigError::BackupFailed(format!("Failed to read backup: {}", e))
                })?;
                write_atomically(settings_path, &backup_content)?;
                info!(backup = %backup_path.display(), "settings rolled back");
            }
            None => {
                if settings_path.exists() {
                    fs::remove_file(settings_path)?;
                }
                info!("settings rolled back to first-run state");
            }
        }

        Ok(())
    }
}

fn write_atomically(path: &Path, content: &str) -> Result<(), ConfigError> {
    // Open file for atomic writing
    let mut file = AtomicWriteFile::options()
        .open(path)
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to open for atomic write: {}", e)))?;

    file.write_all(content.as_bytes())
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to write content: {}", e)))?;

    // Commit atomically
    file.commit()
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    Ok(())
}
