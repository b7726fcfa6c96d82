//! src/core/types.rs
//!
//! Core type definitions for chord management
//!
//! This module defines the fundamental types used throughout the crate:
//! - `ChordKind`: What a chord does once triggered (Text, Command, Template, File)
//! - `CanonicalKey`: The order-independent identity of a chord's keys
//! - `ChordDefinition`: A complete chord with its trigger keys and payload
//! - `ChordId`: Stable identity of a definition inside a registry
//!
//! All persisted types implement serialisation so settings can be written
//! back to disk exactly as they are held in memory.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The action a chord performs once its keys are recognised
///
/// The set is closed: dispatch matches exhaustively on it, so adding a kind
/// is a compile-time checked change.
///
/// Serialises as its name. Deserialises from a name or from its index in
/// [`ChordKind::ALL`], the form older settings files use.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub enum ChordKind {
    /// Replace the trigger with literal text
    #[default]
    Text,
    /// Run a host command looked up by its display name
    Command,
    /// Insert a file after passing it through the template collaborator
    Template,
    /// Insert the contents of a file
    File,
}

impl ChordKind {
    /// Every kind, in display order
    pub const ALL: [ChordKind; 4] = [
        ChordKind::Text,
        ChordKind::Command,
        ChordKind::Template,
        ChordKind::File,
    ];
}

impl fmt::Display for ChordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChordKind::Text => write!(f, "Text"),
            ChordKind::Command => write!(f, "Command"),
            ChordKind::Template => write!(f, "Template"),
            ChordKind::File => write!(f, "File"),
        }
    }
}

impl FromStr for ChordKind {
    type Err = String;

    /// Parses a kind name case-insensitively ("text", "Command", ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChordKind::ALL
            .into_iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown chord kind '{}'", s))
    }
}

/// `chordType` as it may appear in a settings file
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredKind {
    Index(u64),
    Name(String),
}

impl<'de> Deserialize<'de> for ChordKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StoredKind::deserialize(deserializer)? {
            StoredKind::Index(index) => usize::try_from(index)
                .ok()
                .and_then(|index| ChordKind::ALL.get(index).copied())
                .ok_or_else(|| de::Error::custom(format!("unknown chord kind index {}", index))),
            StoredKind::Name(name) => name.parse().map_err(de::Error::custom),
        }
    }
}

/// Sorts the characters of `raw` into code-point order.
///
/// Two inputs holding the same multiset of characters canonicalise to the
/// same string, whatever order they were pressed in. Duplicated characters
/// are kept: "aab" and "ab" are different chords.
pub fn canonicalize(raw: &str) -> String {
    let mut chars: Vec<char> = raw.chars().collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

/// The order-independent identity of a chord's trigger keys
///
/// Implements Hash and Eq for use as HashMap keys in the registry index.
/// An empty canonical key never identifies a chord.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Canonicalises raw trigger input
    pub fn new(raw: &str) -> Self {
        Self(canonicalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a definition inside a registry
///
/// Ids are handed out by the registry and never reused while it lives, so
/// the canonical index keeps pointing at the right definition across
/// removals and reordering.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ChordId(pub(crate) u64);

impl fmt::Display for ChordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A complete chord definition
///
/// # Example
/// ```
/// use chords::core::{ChordDefinition, ChordKind};
///
/// let chord = ChordDefinition::new("sav", "Save current file", ChordKind::Command);
/// assert_eq!(chord.canonical_key().as_str(), "asv");
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChordDefinition {
    /// Raw trigger characters as the operator typed them (may repeat)
    pub key: String,

    /// Payload: literal text, command name or file path depending on kind
    pub value: String,

    /// What the chord does
    #[serde(rename = "chordType")]
    pub kind: ChordKind,
}

impl ChordDefinition {
    pub fn new(key: impl Into<String>, value: impl Into<String>, kind: ChordKind) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind,
        }
    }

    /// An empty Text chord, as created by "Add new chord"
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new(&self.key)
    }
}

impl fmt::Display for ChordDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] → {}", self.key, self.kind, self.value)
    }
}
