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

//! Contracts the host application fulfils for the dispatcher
//!
//! The dispatcher never touches a document directly. Everything it needs
//! from the surrounding editor goes through these traits:
//!
//! - **`Editor`**: cursor, range replacement and focus of the active editor
//! - **`ActionRegistry`**: named host commands (Command chords)
//! - **`ContentStore`**: files addressed by path (File and Template chords)
//! - **`TemplateExpander`**: optional templating collaborator
//! - **`Notifier`**: fire-and-forget operator messages
//!
//! Everything except `Editor` is `Send + Sync` so content reads can run off
//! the thread that owns the editor.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A location in the document
///
/// `ch` counts characters (not bytes) from the start of `line`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }

    /// Position reached after typing `text` starting here
    pub fn advance(self, text: &str) -> Self {
        text.chars().fold(self, |pos, c| {
            if c == '\n' {
                Position::new(pos.line + 1, 0)
            } else {
                Position::new(pos.line, pos.ch + 1)
            }
        })
    }

    /// Position `count` characters to the left on the same line
    ///
    /// Saturates at the start of the line.
    pub fn back(self, count: usize) -> Self {
        Position::new(self.line, self.ch.saturating_sub(count))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.ch)
    }
}

/// Failure reported by a collaborator
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{0}")]
pub struct HostError(pub String);

/// The editor that currently has (or had) input focus
pub trait Editor {
    fn cursor(&self) -> Position;

    /// Replaces the text between `from` and `to` with `text`
    fn replace_range(&mut self, text: &str, from: Position, to: Position);

    fn set_cursor(&mut self, position: Position);

    fn has_focus(&self) -> bool;

    /// Path of the document being edited, when the host knows it
    fn file_path(&self) -> Option<String> {
        None
    }
}

/// A host command as listed by the action registry
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Action {
    pub id: String,
    pub name: String,
}

impl Action {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Named host commands
pub trait ActionRegistry: Send + Sync {
    fn list_actions(&self) -> Vec<Action>;

    fn invoke(&self, id: &str) -> Result<(), HostError>;
}

/// A resolved content-store entry
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentHandle {
    pub path: String,
}

/// Files addressed by path
pub trait ContentStore: Send + Sync {
    /// Resolves `path` to a readable entry, or `None` if nothing is there
    fn resolve(&self, path: &str) -> Option<ContentHandle>;

    fn read_text(&self, handle: &ContentHandle) -> Result<String, HostError>;

    /// Paths offered as suggestions, in the store's order
    fn list_paths(&self) -> Vec<String>;
}

/// Information handed to the template collaborator
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TemplateContext {
    /// The document the expansion will be inserted into
    pub target_file: Option<String>,
}

/// Optional templating collaborator for Template chords
pub trait TemplateExpander: Send + Sync {
    fn expand(&self, text: &str, context: &TemplateContext) -> Result<String, HostError>;

    /// Strips cursor-jump markers, returning the cleaned text and the
    /// character offsets where markers stood
    ///
    /// Collaborators without cursor markers keep the default.
    fn split_cursor_markers(&self, _text: &str) -> Option<(String, Vec<usize>)> {
        None
    }
}

/// Operator-facing messages
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Bundle of collaborators shared by every dispatch
#[derive(Clone)]
pub struct Host {
    pub actions: Arc<dyn ActionRegistry>,
    pub content: Arc<dyn ContentStore>,
    pub templates: Option<Arc<dyn TemplateExpander>>,
    pub notifier: Arc<dyn Notifier>,
}

impl Host {
    /// Creates a host without a template collaborator
    pub fn new(
        actions: Arc<dyn ActionRegistry>,
        content: Arc<dyn ContentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            actions,
            content,
            templates: None,
            notifier,
        }
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateExpander>) -> Self {
        self.templates = Some(templates);
        self
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("templates", &self.templates.is_some())
            .finish_non_exhaustive()
    }
}
