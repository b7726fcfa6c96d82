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

//! Keystroke accumulation with a debounced flush
//!
//! ```text
//!            char (focused)                 char: cancel timer, restart
//!   ┌──────┐ ───────────────▶ ┌──────────────┐ ◀──────┐
//!   │ Idle │                  │ Accumulating │ ───────┘
//!   └──────┘ ◀─────────────── └──────────────┘
//!        named key / focus lost: discard
//!        timer expiry: flush buffer
//! ```
//!
//! The accumulator never reads a clock itself. Callers pass `now` with each
//! event and ask for due flushes with [`KeystrokeAccumulator::poll`], or fire
//! a specific timer with [`KeystrokeAccumulator::expire`]. At most one timer
//! is pending: scheduling a new one always replaces the previous handle, so
//! a stale timer that still fires is ignored.

use std::time::{Duration, Instant};
use tracing::debug;

/// A keydown event as the host reports it
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyEvent {
    /// A key producing exactly one character
    Char(char),
    /// Any other key (modifiers, navigation, Enter, ...), by name
    Named(String),
}

impl KeyEvent {
    /// Classifies a host key name: one character is a `Char`, anything
    /// longer is `Named`
    pub fn from_key(key: &str) -> Self {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => KeyEvent::Char(c),
            _ => KeyEvent::Named(key.to_string()),
        }
    }
}

/// Opaque identity of a scheduled flush
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimerHandle(u64);

/// The currently scheduled flush
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PendingFlush {
    pub handle: TimerHandle,
    pub deadline: Instant,
}

/// Observable state of the accumulator
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccumulatorState {
    /// Empty buffer, no timer
    Idle,
    /// Non-empty buffer, exactly one timer pending
    Accumulating,
}

/// What a key event did to the accumulator
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyOutcome {
    /// The editor was unfocused; nothing changed
    Ignored,
    /// The character was buffered and the flush (re)scheduled
    Scheduled(PendingFlush),
    /// A named key discarded the buffer
    Discarded,
}

/// Buffers recent keypresses and decides when they should be evaluated
#[derive(Debug)]
pub struct KeystrokeAccumulator {
    buffer: String,
    pending: Option<PendingFlush>,
    delay: Duration,
    next_handle: u64,
}

impl KeystrokeAccumulator {
    /// Creates an idle accumulator with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Self {
            buffer: String::new(),
            pending: None,
            delay,
            next_handle: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Changes the quiet period; applies from the next keystroke
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn pending(&self) -> Option<PendingFlush> {
        self.pending
    }

    /// Deadline of the pending flush, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|pending| pending.deadline)
    }

    pub fn state(&self) -> AccumulatorState {
        if self.pending.is_some() {
            AccumulatorState::Accumulating
        } else {
            AccumulatorState::Idle
        }
    }

    /// Feeds one keydown event
    ///
    /// `focused` reports whether the target editor has input focus; events
    /// while unfocused leave the state untouched.
    pub fn on_key(&mut self, event: &KeyEvent, focused: bool, now: Instant) -> KeyOutcome {
        if !focused {
            return KeyOutcome::Ignored;
        }

        match event {
            KeyEvent::Char(c) => {
                self.buffer.push(*c);

                let handle = TimerHandle(self.next_handle);
                self.next_handle = self.next_handle.wrapping_add(1);

                let pending = PendingFlush {
                    handle,
                    deadline: now + self.delay,
                };
                // Replacing the handle cancels the previous timer
                self.pending = Some(pending);

                debug!(buffer = %self.buffer, delay_ms = self.delay.as_millis() as u64, "flush scheduled");
                KeyOutcome::Scheduled(pending)
            }
            KeyEvent::Named(name) => {
                if !self.buffer.is_empty() {
                    debug!(key = %name, discarded = %self.buffer, "named key reset chord buffer");
                }
                self.reset();
                KeyOutcome::Discarded
            }
        }
    }

    /// Discards the buffer because the editor lost focus
    pub fn on_focus_lost(&mut self) {
        if !self.buffer.is_empty() {
            debug!(discarded = %self.buffer, "focus lost, chord buffer discarded");
        }
        self.reset();
    }

    /// Flushes the buffer if the pending timer is due at `now`
    ///
    /// The buffer is cleared before it is returned, so typing that arrives
    /// while the caller handles the flush starts a fresh chord.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.pending {
            Some(pending) if pending.deadline <= now => self.flush(),
            _ => None,
        }
    }

    /// Fires the timer identified by `handle`
    ///
    /// Handles that were superseded or cancelled return `None`.
    pub fn expire(&mut self, handle: TimerHandle) -> Option<String> {
        match self.pending {
            Some(pending) if pending.handle == handle => self.flush(),
            _ => None,
        }
    }

    /// Returns to Idle: empty buffer, no timer
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pending = None;
    }

    fn flush(&mut self) -> Option<String> {
        self.pending = None;
        let input = std::mem::take(&mut self.buffer);
        debug!(input = %input, "chord buffer flushed");
        Some(input)
    }
}
