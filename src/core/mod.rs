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

//! src/core/mod.rs
//!
//! Core chord recognition logic
//!
//! This module contains the fundamental data structures and algorithms
//! for recognising chords, including:
//! - Type definitions and the canonicaliser
//! - The chord registry with its duplicate-safe canonical index
//! - The debounced keystroke accumulator
//! - Definition validation and the keystroke script parser
//!
//! Nothing in here reads a clock or touches the filesystem, so the whole
//! module is testable without an editor.

pub mod accumulator;
pub mod parser;
pub mod registry;
pub mod types;
pub mod validator;

pub use accumulator::{AccumulatorState, KeyEvent, KeyOutcome, KeystrokeAccumulator, TimerHandle};
pub use registry::{ChordRegistry, Conflict, RegistryError};
pub use types::*;
pub use validator::{validate_chord, ValidationError};

#[cfg(test)]
mod tests;
