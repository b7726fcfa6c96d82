//! Persisted chord settings
//!
//! The settings file is camelCase JSON. Every field has a default, so a
//! partial or older file loads with the missing fields filled in.
//!
//! # Delay and typing speed
//!
//! A word is about six characters, so the gap between keystrokes at `wpm`
//! words per minute is `10_000 / wpm` ms. Chord keys have to arrive faster
//! than normal typing, so the quiet period is a third of that:
//!
//! ```text
//! delay = 3333 / wpm        wpm = 3333 / delay
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ConfigError;
use crate::core::types::{ChordDefinition, ChordKind};

/// Divisor relating typing speed to the quiet period
pub const DELAY_CONSTANT: f64 = 3333.0;

/// Typing speed the default delay is derived from
pub const DEFAULT_WPM: f64 = 80.0;

/// Longest quiet period accepted, in milliseconds (one minute)
pub const MAX_DELAY_MS: f64 = 60_000.0;

/// Converts words per minute to a delay in milliseconds
pub fn wpm_to_delay(wpm: f64) -> f64 {
    DELAY_CONSTANT / wpm
}

/// Converts a delay in milliseconds to words per minute
pub fn delay_to_wpm(delay_ms: f64) -> f64 {
    DELAY_CONSTANT / delay_ms
}

/// Accepts delays from zero up to [`MAX_DELAY_MS`]
pub fn validate_delay(delay_ms: f64) -> Result<f64, ConfigError> {
    if delay_ms.is_finite() && (0.0..=MAX_DELAY_MS).contains(&delay_ms) {
        Ok(delay_ms)
    } else {
        Err(ConfigError::InvalidNumber(delay_ms))
    }
}

/// Accepts finite, positive typing speeds whose delay is in range
pub fn validate_wpm(wpm: f64) -> Result<f64, ConfigError> {
    if wpm.is_finite() && wpm > 0.0 && validate_delay(wpm_to_delay(wpm)).is_ok() {
        Ok(wpm)
    } else {
        Err(ConfigError::InvalidNumber(wpm))
    }
}

/// Everything the chord engine persists
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Quiet period in milliseconds
    pub delay: f64,

    /// True when the delay was entered directly instead of derived from WPM
    pub set_delay_manually: bool,

    pub show_text_chord_executed: bool,
    pub show_template_chord_executed: bool,
    pub show_file_chord_executed: bool,
    pub show_command_chord_executed: bool,

    /// Chords in display order
    pub chords: Vec<ChordDefinition>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay: wpm_to_delay(DEFAULT_WPM),
            set_delay_manually: false,
            show_text_chord_executed: false,
            show_template_chord_executed: false,
            show_file_chord_executed: false,
            show_command_chord_executed: true,
            chords: Vec::new(),
        }
    }
}

impl Settings {
    /// The quiet period as a `Duration`
    ///
    /// A stored delay that is negative or not a number counts as zero; one
    /// above [`MAX_DELAY_MS`] counts as the maximum.
    pub fn delay_duration(&self) -> Duration {
        if self.delay.is_finite() && self.delay > 0.0 {
            let delay_ms = self.delay.min(MAX_DELAY_MS);
            Duration::try_from_secs_f64(delay_ms / 1000.0).unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        }
    }

    /// Typing speed implied by the current delay
    pub fn wpm(&self) -> f64 {
        delay_to_wpm(self.delay)
    }

    /// Whether a "Chord Executed" notice is shown for `kind`
    pub fn shows_notice(&self, kind: ChordKind) -> bool {
        match kind {
            ChordKind::Text => self.show_text_chord_executed,
            ChordKind::Template => self.show_template_chord_executed,
            ChordKind::File => self.show_file_chord_executed,
            ChordKind::Command => self.show_command_chord_executed,
        }
    }

    pub fn set_notice(&mut self, kind: ChordKind, on: bool) {
        let flag = match kind {
            ChordKind::Text => &mut self.show_text_chord_executed,
            ChordKind::Template => &mut self.show_template_chord_executed,
            ChordKind::File => &mut self.show_file_chord_executed,
            ChordKind::Command => &mut self.show_command_chord_executed,
        };
        *flag = on;
    }
}
