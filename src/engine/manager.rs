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

//! Chord manager - the settings operations
//!
//! Every mutation follows the same two steps:
//! 1. Apply the change to the in-memory state (registry or settings)
//! 2. Persist a snapshot through the [`SettingsStore`]
//!
//! If step 2 fails the change stays applied and
//! [`ManagerError::PersistenceFailure`] is returned, so the operator can
//! retry with [`ChordManager::save`]. Operations take `&mut self`, which
//! serialises them by construction.

use thiserror::Error;
use tracing::{debug, info};

use crate::config::settings::{validate_delay, validate_wpm, wpm_to_delay};
use crate::config::{ConfigError, Settings, SettingsStore};
use crate::core::registry::{ChordRegistry, Conflict, RegistryError};
use crate::core::types::{ChordDefinition, ChordKind};
use crate::core::validator::validate_value;
use crate::dispatch::host::Host;
use crate::engine::state::EngineState;

/// Errors returned by settings operations
#[derive(Debug, Error)]
pub enum ManagerError {
    /// A position argument was rejected; nothing changed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A delay or typing speed was rejected; nothing changed
    #[error(transparent)]
    InvalidValue(ConfigError),

    /// The change was applied in memory but could not be saved
    #[error("Failed to save settings: {0}")]
    PersistenceFailure(#[source] ConfigError),
}

/// Owns the engine state and keeps it persisted
pub struct ChordManager {
    state: EngineState,
    store: Box<dyn SettingsStore>,
}

impl std::fmt::Debug for ChordManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChordManager")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ChordManager {
    /// Creates a manager for loaded settings
    pub fn new(settings: Settings, store: Box<dyn SettingsStore>) -> Self {
        let state = EngineState::from_settings(settings);
        info!(
            chords = state.registry().len(),
            conflicts = state.registry().conflicts().len(),
            "chord manager ready"
        );
        Self { state, store }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        self.state.settings()
    }

    pub fn registry(&self) -> &ChordRegistry {
        self.state.registry()
    }

    /// Active definition for raw input
    pub fn lookup(&self, input: &str) -> Option<&ChordDefinition> {
        self.state.registry().lookup(input)
    }

    /// Persists the current state
    pub fn save(&self) -> Result<(), ManagerError> {
        self.store
            .save(&self.state.snapshot())
            .map_err(ManagerError::PersistenceFailure)
    }

    // ------------------------------------------------------------------
    // Chord list
    // ------------------------------------------------------------------

    /// Appends a chord and activates it, returning its position
    pub fn add_chord(&mut self, chord: ChordDefinition) -> Result<usize, ManagerError> {
        debug!(chord = %chord, "adding chord");
        let position = self.state.registry_mut().add(chord);
        self.save()?;
        Ok(position)
    }

    /// Appends an empty Text chord
    ///
    /// It stays unindexed until a key is set.
    pub fn add_blank_chord(&mut self) -> Result<usize, ManagerError> {
        self.add_chord(ChordDefinition::blank())
    }

    pub fn remove_chord(&mut self, position: usize) -> Result<ChordDefinition, ManagerError> {
        let removed = self.state.registry_mut().remove(position)?;
        debug!(chord = %removed, position, "removed chord");
        self.save()?;
        Ok(removed)
    }

    pub fn update_key(&mut self, position: usize, key: &str) -> Result<(), ManagerError> {
        self.state.registry_mut().update_key(position, key)?;
        self.save()
    }

    pub fn update_value(&mut self, position: usize, value: &str) -> Result<(), ManagerError> {
        self.state.registry_mut().update_value(position, value)?;
        self.save()
    }

    pub fn update_kind(&mut self, position: usize, kind: ChordKind) -> Result<(), ManagerError> {
        self.state.registry_mut().update_kind(position, kind)?;
        self.save()
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), ManagerError> {
        self.state.registry_mut().swap(a, b)?;
        self.save()
    }

    /// Moves a chord one place towards the top of the list
    pub fn move_up(&mut self, position: usize) -> Result<(), ManagerError> {
        let above = position
            .checked_sub(1)
            .ok_or(RegistryError::PositionOutOfRange {
                position,
                len: self.registry().len(),
            })?;
        self.swap(above, position)
    }

    /// Moves a chord one place towards the bottom of the list
    pub fn move_down(&mut self, position: usize) -> Result<(), ManagerError> {
        self.swap(position, position + 1)
    }

    // ------------------------------------------------------------------
    // Delay and notices
    // ------------------------------------------------------------------

    /// Sets the quiet period directly, in milliseconds
    pub fn set_delay_ms(&mut self, delay_ms: f64) -> Result<(), ManagerError> {
        let delay_ms = validate_delay(delay_ms).map_err(ManagerError::InvalidValue)?;
        self.state.settings_mut().delay = delay_ms;
        info!(delay_ms, "chord delay changed");
        self.save()
    }

    /// Derives the quiet period from a typing speed
    pub fn set_wpm(&mut self, wpm: f64) -> Result<(), ManagerError> {
        let wpm = validate_wpm(wpm).map_err(ManagerError::InvalidValue)?;
        let delay_ms = wpm_to_delay(wpm);
        self.state.settings_mut().delay = delay_ms;
        info!(wpm, delay_ms, "chord delay derived from typing speed");
        self.save()
    }

    pub fn set_delay_manually(&mut self, manual: bool) -> Result<(), ManagerError> {
        self.state.settings_mut().set_delay_manually = manual;
        self.save()
    }

    /// Turns the "Chord Executed" notice for `kind` on or off
    pub fn set_notice(&mut self, kind: ChordKind, on: bool) -> Result<(), ManagerError> {
        self.state.settings_mut().set_notice(kind, on);
        self.save()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_duplicate(&self, position: usize) -> bool {
        self.registry().is_duplicate(position)
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        self.registry().conflicts()
    }

    /// Chords whose key, value or kind contains `query` (case-insensitive)
    ///
    /// Returns positions alongside the definitions. An empty query returns
    /// every chord.
    pub fn filter(&self, query: &str) -> Vec<(usize, &ChordDefinition)> {
        let query_lower = query.trim().to_lowercase();

        self.registry()
            .iter()
            .enumerate()
            .filter(|(_, chord)| {
                query_lower.is_empty()
                    || chord.key.to_lowercase().contains(&query_lower)
                    || chord.value.to_lowercase().contains(&query_lower)
                    || chord.kind.to_string().to_lowercase().contains(&query_lower)
            })
            .collect()
    }

    /// Whether the chord's value points at something the host knows
    ///
    /// Out-of-range positions are never valid.
    pub fn has_valid_value(&self, position: usize, host: &Host) -> bool {
        self.registry()
            .get(position)
            .map(|chord| {
                validate_value(chord, Some(host.actions.as_ref()), Some(host.content.as_ref())).is_ok()
            })
            .unwrap_or(false)
    }
}
