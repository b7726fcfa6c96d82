//! Engine module tests
//!
//! Contains test suites for:
//! - Settings operations and persistence through the chord manager
//! - Key handling, flushing and notices in the synchronous engine
//! - The async runtime on a paused tokio clock

#[cfg(test)]
mod runtime_tests;

use std::sync::{Arc, Mutex};

use crate::config::{ConfigError, Settings, SettingsStore};

/// Store that keeps every saved snapshot in memory
#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryStore {
    saved: Arc<Mutex<Vec<Settings>>>,
}

impl MemoryStore {
    pub(crate) fn saves(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub(crate) fn last(&self) -> Option<Settings> {
        self.saved.lock().unwrap().last().cloned()
    }
}

impl SettingsStore for MemoryStore {
    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        self.saved.lock().unwrap().push(settings.clone());
        Ok(())
    }
}

/// Store whose every save fails
#[derive(Debug, Default)]
pub(crate) struct FailingStore;

impl SettingsStore for FailingStore {
    fn save(&self, _settings: &Settings) -> Result<(), ConfigError> {
        Err(ConfigError::WriteFailed("disk full".to_string()))
    }
}
