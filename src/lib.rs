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

//! Chords
//!
//! Recognises short, order-independent keystroke combinations ("chords")
//! typed in a text editor and runs the action bound to them: inserting
//! text, invoking a named command, inserting a file or expanding a
//! template.
//!
//! # Features
//!
//! - **Order-insensitive matching:** "sav", "vsa" and "asv" are one chord
//! - **Debounced recognition:** keys are evaluated after a quiet period
//!   derived from typing speed
//! - **Duplicate-safe registry:** the first definition of a key wins, and
//!   the next one takes over when it goes away
//! - **Atomic settings:** timestamped backups before every write
//!
//! # Architecture
//!
//! - **`core`:** Canonicalisation, registry, accumulator, validation,
//!   keystroke scripts
//! - **`dispatch`:** Executing chords against host collaborators
//! - **`config`:** Settings file, backups and atomic writes
//! - **`engine`:** Wiring, settings operations and the async runtime
//! - **`logging`:** tracing subscriber setup for the binary
//!
//! # Examples
//!
//! ## Looking up a chord
//!
//! ```
//! use chords::core::{ChordDefinition, ChordKind, ChordRegistry};
//!
//! let registry = ChordRegistry::from_definitions(vec![
//!     ChordDefinition::new("sav", "Save current file", ChordKind::Command),
//! ]);
//!
//! let chord = registry.lookup("vas").unwrap();
//! assert_eq!(chord.value, "Save current file");
//! ```
//!
//! ## Dispatching a Text chord
//!
//! ```
//! use std::sync::Arc;
//! use chords::core::{ChordDefinition, ChordKind};
//! use chords::dispatch::host::Host;
//! use chords::dispatch::memory::{MemoryActions, MemoryContentStore, MemoryEditor, LogNotifier};
//! use chords::dispatch::Dispatcher;
//!
//! let host = Host::new(
//!     Arc::new(MemoryActions::default()),
//!     Arc::new(MemoryContentStore::new()),
//!     Arc::new(LogNotifier),
//! );
//! let dispatcher = Dispatcher::new(host);
//!
//! let mut editor = MemoryEditor::new("Dear ab");
//! let chord = ChordDefinition::new("ab", "Sir{c},", ChordKind::Text);
//! dispatcher.dispatch(&chord, "ab", &mut editor).unwrap();
//!
//! assert_eq!(editor.render_with_cursor(), "Dear Sir|,");
//! ```

pub mod config;
pub mod core;
pub mod dispatch;
pub mod engine;
pub mod logging;

// Re-export commonly used types for convenience
pub use core::{ChordDefinition, ChordKind, ChordRegistry, KeyEvent, KeystrokeAccumulator};
pub use engine::{ChordEngine, ChordManager};
