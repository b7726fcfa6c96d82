//! Built-in template collaborator
//!
//! A small templating language for Template chords when no
//! richer collaborator is plugged in:
//!
//! - `{{date}}` the current date (`%Y-%m-%d` unless configured)
//! - `{{time}}` the current time (`%H:%M` unless configured)
//! - `{{title}}` file stem of the document the chord fires in
//! - `{{cursor}}` cursor-jump marker; the first one places the cursor

use chrono::format::{Item, StrftimeItems};
use chrono::{Local, NaiveDateTime};
use std::path::Path;

use super::host::{HostError, TemplateContext, TemplateExpander};

/// Cursor-jump marker understood by [`PlaceholderTemplates`]
pub const CURSOR_PLACEHOLDER: &str = "{{cursor}}";

/// Replaces `{{date}}`, `{{time}}` and `{{title}}` placeholders
#[derive(Clone, Debug)]
pub struct PlaceholderTemplates {
    date_format: String,
    time_format: String,
    /// Fixed clock; `None` reads the local time on every expansion
    now: Option<NaiveDateTime>,
}

impl Default for PlaceholderTemplates {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            time_format: "%H:%M".to_string(),
            now: None,
        }
    }
}

impl PlaceholderTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Expands against a fixed instant instead of the local clock
    pub fn with_fixed_time(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }
}

/// Formats `now`, refusing strftime strings chrono cannot render
fn format_checked(now: NaiveDateTime, format: &str) -> Result<String, HostError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(HostError(format!("invalid date/time format '{}'", format)));
    }
    Ok(now.format(format).to_string())
}

impl TemplateExpander for PlaceholderTemplates {
    fn expand(&self, text: &str, context: &TemplateContext) -> Result<String, HostError> {
        let now = self.now.unwrap_or_else(|| Local::now().naive_local());

        let title = context
            .target_file
            .as_deref()
            .and_then(|path| Path::new(path).file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());

        let replacements = [
            ("date", format_checked(now, &self.date_format)?),
            ("time", format_checked(now, &self.time_format)?),
            ("title", title),
        ];

        let mut result = text.to_string();
        for (name, value) in replacements {
            let placeholder = format!("{{{{{}}}}}", name);
            result = result.replace(&placeholder, &value);
        }

        Ok(result)
    }

    fn split_cursor_markers(&self, text: &str) -> Option<(String, Vec<usize>)> {
        let mut cleaned = String::with_capacity(text.len());
        let mut markers = Vec::new();

        for (index, part) in text.split(CURSOR_PLACEHOLDER).enumerate() {
            if index > 0 {
                markers.push(cleaned.chars().count());
            }
            cleaned.push_str(part);
        }

        Some((cleaned, markers))
    }
}
