//! Config module tests
//!
//! Contains test suites for:
//! - Settings model defaults, JSON shape and delay/WPM conversion
//! - SettingsManager loading, backups and pruning
//! - SettingsTransaction commit and rollback

#[cfg(test)]
mod settings_tests;
