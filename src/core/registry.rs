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

//! Chord registry with duplicate-safe canonical indexing
//!
//! The registry keeps chords in an ordered sequence (display order, and the
//! order in which shadowed duplicates get promoted) plus a HashMap from
//! canonical key to the *active* definition for that key.
//!
//! # Identity instead of positions
//! The index maps `CanonicalKey → ChordId`, and a second map tracks
//! `ChordId → position`. Removing or swapping entries only touches the
//! position map, so surviving index entries never point at a shifted slot.
//!
//! # Duplicates
//! Several definitions may share a canonical key. The first one activated
//! holds the key; the others are shadowed until the holder is deactivated,
//! at which point the first remaining duplicate (in sequence order) is
//! promoted.
//!
//! # Performance
//! - Lookup: O(1) average case
//! - Add / update value / update kind / swap: O(1) average case
//! - Deactivate (promotion scan), remove (position shift), duplicate check: O(n)

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::core::types::{CanonicalKey, ChordDefinition, ChordId, ChordKind};

/// Errors raised by registry operations
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RegistryError {
    /// A position argument does not address an existing definition
    #[error("Chord position {position} out of range (registry holds {len})")]
    PositionOutOfRange { position: usize, len: usize },
}

/// One slot of the ordered sequence
#[derive(Clone, Debug)]
struct Entry {
    id: ChordId,
    canonical: CanonicalKey,
    chord: ChordDefinition,
}

/// A canonical key held by two or more definitions
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Conflict {
    /// The shared canonical key
    pub key: CanonicalKey,

    /// Positions of every definition with this key, in sequence order
    pub positions: Vec<usize>,

    /// Position of the definition currently reachable by lookup
    pub active: Option<usize>,
}

/// Ordered chord definitions plus the canonical lookup index
#[derive(Clone, Debug, Default)]
pub struct ChordRegistry {
    entries: Vec<Entry>,
    /// Canonical key → id of the active holder
    index: HashMap<CanonicalKey, ChordId>,
    /// Id → current position in `entries`
    positions: HashMap<ChordId, usize>,
    next_id: u64,
}

impl ChordRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from persisted definitions, activating them in order
    ///
    /// Earlier definitions win when keys collide, matching the behaviour of
    /// activating each one as it was added.
    pub fn from_definitions(chords: impl IntoIterator<Item = ChordDefinition>) -> Self {
        let mut registry = Self::new();
        for chord in chords {
            registry.add(chord);
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definition stored at `position`
    pub fn get(&self, position: usize) -> Option<&ChordDefinition> {
        self.entries.get(position).map(|entry| &entry.chord)
    }

    /// Stable id of the definition stored at `position`
    pub fn id_at(&self, position: usize) -> Option<ChordId> {
        self.entries.get(position).map(|entry| entry.id)
    }

    /// Current position of the definition with `id`
    pub fn position_of(&self, id: ChordId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Iterates definitions in sequence order
    pub fn iter(&self) -> impl Iterator<Item = &ChordDefinition> {
        self.entries.iter().map(|entry| &entry.chord)
    }

    /// Clones the sequence for persistence
    pub fn definitions(&self) -> Vec<ChordDefinition> {
        self.iter().cloned().collect()
    }

    /// Resolves raw input to the active definition for its canonical key
    ///
    /// Empty input never matches.
    pub fn lookup(&self, raw_input: &str) -> Option<&ChordDefinition> {
        let key = CanonicalKey::new(raw_input);
        self.active_position(&key)
            .and_then(|position| self.get(position))
    }

    /// Position of the active definition for `key`
    pub fn active_position(&self, key: &CanonicalKey) -> Option<usize> {
        if key.is_empty() {
            return None;
        }
        self.index
            .get(key)
            .and_then(|id| self.positions.get(id))
            .copied()
    }

    /// Returns true if the definition at `position` is reachable by lookup
    pub fn is_active(&self, position: usize) -> bool {
        self.entries
            .get(position)
            .map(|entry| self.index.get(&entry.canonical) == Some(&entry.id))
            .unwrap_or(false)
    }

    /// Indexes the definition at `position` unless its key is already held
    ///
    /// First-activated wins: when another definition already holds the
    /// canonical key, this one stays shadowed. Empty keys are never indexed.
    pub fn activate(&mut self, position: usize) -> Result<(), RegistryError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get(position)
            .ok_or(RegistryError::PositionOutOfRange { position, len })?;

        if entry.canonical.is_empty() {
            return Ok(());
        }

        match self.index.get(&entry.canonical) {
            Some(holder) if *holder != entry.id => {
                debug!(key = %entry.canonical, position, "chord shadowed by existing holder");
            }
            Some(_) => {}
            None => {
                debug!(key = %entry.canonical, position, "chord activated");
                self.index.insert(entry.canonical.clone(), entry.id);
            }
        }

        Ok(())
    }

    /// Removes the definition at `position` from the index if it holds its key
    ///
    /// When it did hold the key, the first other definition sharing the key
    /// is promoted. Shadowed definitions are left as they are.
    pub fn deactivate(&mut self, position: usize) -> Result<(), RegistryError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get(position)
            .ok_or(RegistryError::PositionOutOfRange { position, len })?;

        if self.index.get(&entry.canonical) != Some(&entry.id) {
            return Ok(());
        }

        let (id, key) = (entry.id, entry.canonical.clone());
        self.index.remove(&key);

        let duplicate = self
            .entries
            .iter()
            .position(|other| other.id != id && other.canonical == key);

        if let Some(other) = duplicate {
            debug!(key = %key, from = position, to = other, "promoting shadowed duplicate");
            self.activate(other)?;
        }

        Ok(())
    }

    /// Appends a definition and activates it, returning its position
    pub fn add(&mut self, chord: ChordDefinition) -> usize {
        let id = ChordId(self.next_id);
        self.next_id += 1;

        let position = self.entries.len();
        self.entries.push(Entry {
            id,
            canonical: chord.canonical_key(),
            chord,
        });
        self.positions.insert(id, position);

        // Position was just pushed, so activation cannot fail
        let _ = self.activate(position);
        position
    }

    /// Removes the definition at `position`, promoting a duplicate if needed
    ///
    /// Every later definition shifts down by one; the position map is
    /// updated for all of them so lookups keep resolving correctly.
    pub fn remove(&mut self, position: usize) -> Result<ChordDefinition, RegistryError> {
        self.deactivate(position)?;

        let entry = self.entries.remove(position);
        self.positions.remove(&entry.id);

        for (offset, shifted) in self.entries[position..].iter().enumerate() {
            self.positions.insert(shifted.id, position + offset);
        }

        Ok(entry.chord)
    }

    /// Replaces the trigger keys of the definition at `position`
    pub fn update_key(&mut self, position: usize, new_key: &str) -> Result<(), RegistryError> {
        self.deactivate(position)?;

        if let Some(entry) = self.entries.get_mut(position) {
            entry.chord.key = new_key.to_string();
            entry.canonical = CanonicalKey::new(new_key);
        }

        self.activate(position)
    }

    /// Replaces the payload; index membership is unaffected
    pub fn update_value(&mut self, position: usize, new_value: &str) -> Result<(), RegistryError> {
        let entry = self.entry_mut(position)?;
        entry.chord.value = new_value.to_string();
        Ok(())
    }

    /// Replaces the kind; index membership is unaffected
    pub fn update_kind(&mut self, position: usize, new_kind: ChordKind) -> Result<(), RegistryError> {
        let entry = self.entry_mut(position)?;
        entry.chord.kind = new_kind;
        Ok(())
    }

    /// Exchanges two storage slots
    ///
    /// Lookups resolve to the same definitions before and after; only the
    /// display order changes.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), RegistryError> {
        let len = self.entries.len();
        for position in [a, b] {
            if position >= len {
                return Err(RegistryError::PositionOutOfRange { position, len });
            }
        }

        self.entries.swap(a, b);
        self.positions.insert(self.entries[a].id, a);
        self.positions.insert(self.entries[b].id, b);

        Ok(())
    }

    /// Returns true if any other definition shares this canonical key
    ///
    /// Symmetric: both members of a duplicate pair report true, whichever
    /// one is active. Empty keys are never reported as duplicates.
    pub fn is_duplicate(&self, position: usize) -> bool {
        let Some(entry) = self.entries.get(position) else {
            return false;
        };

        !entry.canonical.is_empty()
            && self
                .entries
                .iter()
                .any(|other| other.id != entry.id && other.canonical == entry.canonical)
    }

    /// Lists every canonical key held by two or more definitions
    ///
    /// Groups are ordered by the position of their first member.
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut groups: Vec<Conflict> = Vec::new();

        for (position, entry) in self.entries.iter().enumerate() {
            if entry.canonical.is_empty() {
                continue;
            }
            match groups.iter_mut().find(|group| group.key == entry.canonical) {
                Some(group) => group.positions.push(position),
                None => groups.push(Conflict {
                    key: entry.canonical.clone(),
                    positions: vec![position],
                    active: self.active_position(&entry.canonical),
                }),
            }
        }

        groups.retain(|group| group.positions.len() > 1);
        groups
    }

    fn entry_mut(&mut self, position: usize) -> Result<&mut Entry, RegistryError> {
        let len = self.entries.len();
        self.entries
            .get_mut(position)
            .ok_or(RegistryError::PositionOutOfRange { position, len })
    }
}
