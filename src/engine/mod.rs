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

//! Chord engine
//!
//! Wires the pieces together:
//!
//! ```text
//! key events → KeystrokeAccumulator → (flush) → ChordRegistry::lookup
//!                                                   ↓
//!                  Notifier ← notices ← Dispatcher::begin / finish
//! ```
//!
//! The engine is synchronous and clock-free. [`runtime::run`] drives it
//! from an event channel with a real (or paused) tokio clock.

pub mod manager;
pub mod runtime;
pub mod state;

use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::accumulator::{KeyEvent, KeyOutcome, KeystrokeAccumulator};
use crate::core::types::ChordDefinition;
use crate::dispatch::host::Editor;
use crate::dispatch::{ChordOutcome, ContentJob, Dispatch, DispatchError, Dispatcher, LoadedContent};

pub use manager::{ChordManager, ManagerError};
pub use state::EngineState;

/// A chord whose content is still being read
#[derive(Debug)]
pub struct PendingChord {
    pub chord: ChordDefinition,
    pub job: ContentJob,
}

/// What a flush did once a chord matched
#[derive(Debug)]
pub enum Fired {
    /// The chord completed
    Done(ChordOutcome),
    /// The chord failed; the operator has been notified
    Failed(DispatchError),
    /// The chord waits for its content job
    Pending(PendingChord),
}

/// Recognises chords in a stream of key events and executes them
#[derive(Debug)]
pub struct ChordEngine {
    manager: ChordManager,
    accumulator: KeystrokeAccumulator,
    dispatcher: Dispatcher,
}

impl ChordEngine {
    pub fn new(manager: ChordManager, dispatcher: Dispatcher) -> Self {
        let accumulator = KeystrokeAccumulator::new(manager.state().delay());
        Self {
            manager,
            accumulator,
            dispatcher,
        }
    }

    pub fn manager(&self) -> &ChordManager {
        &self.manager
    }

    /// Settings operations; a changed delay applies from the next keystroke
    pub fn manager_mut(&mut self) -> &mut ChordManager {
        &mut self.manager
    }

    pub fn accumulator(&self) -> &KeystrokeAccumulator {
        &self.accumulator
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// When the pending flush is due, if one is scheduled
    pub fn deadline(&self) -> Option<Instant> {
        self.accumulator.deadline()
    }

    /// Feeds a keydown event from `editor`
    pub fn handle_key(&mut self, event: &KeyEvent, editor: &dyn Editor, now: Instant) -> KeyOutcome {
        self.accumulator.set_delay(self.manager.state().delay());
        self.accumulator.on_key(event, editor.has_focus(), now)
    }

    /// The editor lost focus; any partial chord is discarded
    pub fn focus_lost(&mut self) {
        self.accumulator.on_focus_lost();
    }

    /// Flushes the buffer if it is due and executes the matching chord
    ///
    /// Returns `None` when nothing was due or the input matched no chord.
    /// File and Template chords come back as [`Fired::Pending`]; hand the
    /// job's result to [`ChordEngine::complete`].
    pub fn poll(&mut self, editor: &mut dyn Editor, now: Instant) -> Option<Fired> {
        let input = self.accumulator.poll(now)?;
        self.fire(&input, editor)
    }

    /// Like [`ChordEngine::poll`], but reads File and Template content inline
    pub fn poll_inline(
        &mut self,
        editor: &mut dyn Editor,
        now: Instant,
    ) -> Option<Result<ChordOutcome, DispatchError>> {
        match self.poll(editor, now)? {
            Fired::Done(outcome) => Some(Ok(outcome)),
            Fired::Failed(err) => Some(Err(err)),
            Fired::Pending(PendingChord { chord, job }) => {
                Some(self.complete(editor, &chord, job.run()))
            }
        }
    }

    /// Looks up flushed input and starts its chord
    pub fn fire(&mut self, input: &str, editor: &mut dyn Editor) -> Option<Fired> {
        let Some(chord) = self.manager.lookup(input).cloned() else {
            debug!(input, "no chord for input");
            return None;
        };

        match self.dispatcher.begin(&chord, input, editor) {
            Ok(Dispatch::Done(outcome)) => {
                self.executed(&chord);
                Some(Fired::Done(outcome))
            }
            Ok(Dispatch::Load(job)) => Some(Fired::Pending(PendingChord { chord, job })),
            Err(err) => {
                self.failed(&chord, &err);
                Some(Fired::Failed(err))
            }
        }
    }

    /// Applies the result of a content job started by [`ChordEngine::poll`]
    ///
    /// The edit lands at the editor's current cursor, wherever it is now.
    pub fn complete(
        &self,
        editor: &mut dyn Editor,
        chord: &ChordDefinition,
        loaded: Result<LoadedContent, DispatchError>,
    ) -> Result<ChordOutcome, DispatchError> {
        match loaded {
            Ok(loaded) => {
                let outcome = self.dispatcher.finish(editor, loaded);
                self.executed(chord);
                Ok(outcome)
            }
            Err(err) => {
                self.failed(chord, &err);
                Err(err)
            }
        }
    }

    /// Cancels the pending flush; the engine can be dropped afterwards
    pub fn shutdown(&mut self) {
        if !self.accumulator.buffer().is_empty() {
            debug!(discarded = %self.accumulator.buffer(), "shutdown discarded chord buffer");
        }
        self.accumulator.reset();
        info!("chord engine stopped");
    }

    fn executed(&self, chord: &ChordDefinition) {
        info!(key = %chord.key, kind = %chord.kind, "chord executed");
        if self.manager.settings().shows_notice(chord.kind) {
            self.dispatcher
                .notify(&format!("{} Chord Executed: {}", chord.kind, chord.key));
        }
    }

    fn failed(&self, chord: &ChordDefinition, err: &DispatchError) {
        warn!(key = %chord.key, kind = %chord.kind, error = %err, "chord failed");
        self.dispatcher.notify(&err.to_string());
    }
}

#[cfg(test)]
mod tests;
