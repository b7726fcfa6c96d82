//! Engine state owned by the chord manager
//!
//! Settings and chords are held apart: the registry owns the chords (and
//! their canonical index), the settings keep everything else. A snapshot
//! puts them back together for persistence.

use std::time::Duration;

use crate::config::Settings;
use crate::core::registry::ChordRegistry;

#[derive(Clone, Debug, Default)]
pub struct EngineState {
    /// Settings with an always-empty `chords` list
    settings: Settings,
    registry: ChordRegistry,
}

impl EngineState {
    /// Builds state from loaded settings, activating chords in stored order
    pub fn from_settings(mut settings: Settings) -> Self {
        let chords = std::mem::take(&mut settings.chords);
        Self {
            settings,
            registry: ChordRegistry::from_definitions(chords),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn registry(&self) -> &ChordRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ChordRegistry {
        &mut self.registry
    }

    /// Current quiet period
    pub fn delay(&self) -> Duration {
        self.settings.delay_duration()
    }

    /// Full settings including chords in display order
    pub fn snapshot(&self) -> Settings {
        Settings {
            chords: self.registry.definitions(),
            ..self.settings.clone()
        }
    }
}
