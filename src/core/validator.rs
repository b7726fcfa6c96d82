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

//! Chord definition validation
//!
//! Two layers:
//! - Key checks need nothing but the definition: a key must not be empty
//!   (it would never be indexed) and must not contain control characters
//!   (no keydown produces them as a single character)
//! - Value checks consult the host: a Command must name a known action and
//!   a File or Template must resolve in the content store
//!
//! Text values are always valid.

use thiserror::Error;

use crate::core::types::{ChordDefinition, ChordKind};
use crate::dispatch::host::{ActionRegistry, ContentStore};

/// Validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Key is empty and can never trigger
    #[error("Chord key is empty")]
    EmptyKey,

    /// Key contains a character no keypress produces
    #[error("Chord key contains control character {0:?}")]
    ControlCharacter(char),

    /// Command value names no host action
    #[error("Command not found: {0}")]
    UnknownCommand(String),

    /// File or Template value does not resolve
    #[error("File not found for chord: {0}")]
    UnresolvedPath(String),
}

/// Validates the trigger keys
pub fn validate_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }

    match key.chars().find(|c| c.is_control()) {
        Some(c) => Err(ValidationError::ControlCharacter(c)),
        None => Ok(()),
    }
}

/// Validates the payload against whichever collaborators are available
///
/// A check whose collaborator is `None` is skipped.
pub fn validate_value(
    chord: &ChordDefinition,
    actions: Option<&dyn ActionRegistry>,
    content: Option<&dyn ContentStore>,
) -> Result<(), ValidationError> {
    match chord.kind {
        ChordKind::Text => Ok(()),
        ChordKind::Command => match actions {
            Some(actions)
                if !actions
                    .list_actions()
                    .iter()
                    .any(|action| action.name == chord.value) =>
            {
                Err(ValidationError::UnknownCommand(chord.value.clone()))
            }
            _ => Ok(()),
        },
        ChordKind::File | ChordKind::Template => match content {
            Some(content) if content.resolve(&chord.value).is_none() => {
                Err(ValidationError::UnresolvedPath(chord.value.clone()))
            }
            _ => Ok(()),
        },
    }
}

/// Validates a complete definition, key first
pub fn validate_chord(
    chord: &ChordDefinition,
    actions: Option<&dyn ActionRegistry>,
    content: Option<&dyn ContentStore>,
) -> Result<(), ValidationError> {
    validate_key(&chord.key)?;
    validate_value(chord, actions, content)
}
