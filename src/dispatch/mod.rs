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

//! Chord dispatch
//!
//! Executes a matched chord against the active editor. Every kind first
//! deletes the trigger characters in front of the cursor, then:
//!
//! - **Text**: inserts the value after the `{c}` / `\\` transforms
//! - **Command**: invokes the host action whose display name equals the value
//! - **File**: inserts the full text of the file named by the value
//! - **Template**: as File, after the template collaborator expanded it
//!
//! # Two phases
//!
//! File and Template chords read external content. [`Dispatcher::begin`]
//! does everything that touches the editor up front and hands back a
//! [`ContentJob`] that can run anywhere (it is `Send`). Once the job has
//! produced its [`LoadedContent`], [`Dispatcher::finish`] applies it.
//! [`Dispatcher::dispatch`] chains the phases for synchronous callers.
//!
//! Dispatch holds no mutable state between calls, so a new chord can be
//! dispatched while an earlier job is still running.

pub mod host;
pub mod memory;
pub mod suggest;
pub mod templates;
pub mod text;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::types::{ChordDefinition, ChordKind};
use host::{ContentStore, Editor, Host, Position, TemplateContext, TemplateExpander};
use text::{Insertion, TextTransform};

/// Why a matched chord could not complete
///
/// The Display text is the notification shown to the operator.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DispatchError {
    /// No host action has this display name
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// The content store does not resolve this path
    #[error("File not found for chord: {0}")]
    FileNotFound(String),

    /// Template chord without a template collaborator
    #[error("Templating must be enabled for template chords")]
    TemplatingDisabled,

    /// A collaborator failed while reading, expanding or invoking
    #[error("Chord failed: {0}")]
    Host(String),
}

/// What a completed chord did
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChordOutcome {
    /// Text chord inserted its value
    TextInserted { cursor: Position },
    /// Command chord invoked a host action
    CommandInvoked { id: String },
    /// File or Template chord inserted content
    ContentInserted { path: String, cursor: Position },
}

/// Result of the first dispatch phase
#[derive(Debug)]
pub enum Dispatch {
    /// The chord completed synchronously
    Done(ChordOutcome),
    /// The chord waits for external content
    Load(ContentJob),
}

/// Content read (and possibly expanded) for a File or Template chord
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoadedContent {
    pub path: String,
    pub insertion: Insertion,
}

/// Pending content read for a File or Template chord
pub struct ContentJob {
    path: String,
    content: Arc<dyn ContentStore>,
    /// Present only for Template chords
    templates: Option<Arc<dyn TemplateExpander>>,
    context: TemplateContext,
}

impl std::fmt::Debug for ContentJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentJob")
            .field("path", &self.path)
            .field("template", &self.templates.is_some())
            .finish_non_exhaustive()
    }
}

impl ContentJob {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolves, reads and (for templates) expands the content
    ///
    /// May block on I/O; never touches the editor.
    pub fn run(self) -> Result<LoadedContent, DispatchError> {
        let handle = self
            .content
            .resolve(&self.path)
            .ok_or_else(|| DispatchError::FileNotFound(self.path.clone()))?;

        let raw = self
            .content
            .read_text(&handle)
            .map_err(|e| DispatchError::Host(e.to_string()))?;

        let insertion = match &self.templates {
            None => Insertion::at_end(raw),
            Some(templates) => {
                let expanded = templates
                    .expand(&raw, &self.context)
                    .map_err(|e| DispatchError::Host(e.to_string()))?;

                match templates.split_cursor_markers(&expanded) {
                    Some((text, markers)) => match markers.first() {
                        Some(&cursor_offset) => Insertion { text, cursor_offset },
                        None => Insertion::at_end(text),
                    },
                    None => Insertion::at_end(expanded),
                }
            }
        };

        Ok(LoadedContent {
            path: self.path,
            insertion,
        })
    }
}

/// Executes chords against an editor using the host's collaborators
#[derive(Debug)]
pub struct Dispatcher {
    host: Host,
    text: TextTransform,
}

impl Dispatcher {
    pub fn new(host: Host) -> Self {
        Self {
            host,
            text: TextTransform::new(),
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Sends a message to the notification sink
    pub fn notify(&self, message: &str) {
        self.host.notifier.notify(message);
    }

    /// Runs a chord to completion, reading content inline if needed
    pub fn dispatch(
        &self,
        chord: &ChordDefinition,
        trigger: &str,
        editor: &mut dyn Editor,
    ) -> Result<ChordOutcome, DispatchError> {
        match self.begin(chord, trigger, editor)? {
            Dispatch::Done(outcome) => Ok(outcome),
            Dispatch::Load(job) => {
                let loaded = job.run()?;
                Ok(self.finish(editor, loaded))
            }
        }
    }

    /// First phase: removes the trigger and completes what needs no I/O
    pub fn begin(
        &self,
        chord: &ChordDefinition,
        trigger: &str,
        editor: &mut dyn Editor,
    ) -> Result<Dispatch, DispatchError> {
        debug!(kind = %chord.kind, key = %chord.key, trigger, "dispatching chord");

        match chord.kind {
            ChordKind::Text => {
                let insertion = self.text.apply(&chord.value);
                let cursor = editor.cursor();
                let from = cursor.back(trigger.chars().count());

                editor.replace_range(&insertion.text, from, cursor);
                let cursor = from.advance(insertion.before_cursor());
                editor.set_cursor(cursor);

                Ok(Dispatch::Done(ChordOutcome::TextInserted { cursor }))
            }
            ChordKind::Command => {
                remove_trigger(editor, trigger);

                let action = self
                    .host
                    .actions
                    .list_actions()
                    .into_iter()
                    .find(|action| action.name == chord.value)
                    .ok_or_else(|| DispatchError::CommandNotFound(chord.value.clone()))?;

                self.host
                    .actions
                    .invoke(&action.id)
                    .map_err(|e| DispatchError::Host(e.to_string()))?;

                info!(id = %action.id, name = %action.name, "command chord invoked action");
                Ok(Dispatch::Done(ChordOutcome::CommandInvoked { id: action.id }))
            }
            ChordKind::File => {
                remove_trigger(editor, trigger);

                Ok(Dispatch::Load(ContentJob {
                    path: chord.value.clone(),
                    content: Arc::clone(&self.host.content),
                    templates: None,
                    context: TemplateContext::default(),
                }))
            }
            ChordKind::Template => {
                remove_trigger(editor, trigger);

                let templates = self
                    .host
                    .templates
                    .as_ref()
                    .ok_or(DispatchError::TemplatingDisabled)?;

                Ok(Dispatch::Load(ContentJob {
                    path: chord.value.clone(),
                    content: Arc::clone(&self.host.content),
                    templates: Some(Arc::clone(templates)),
                    context: TemplateContext {
                        target_file: editor.file_path(),
                    },
                }))
            }
        }
    }

    /// Second phase: inserts loaded content at the cursor
    ///
    /// The edit always applies, even if the cursor moved while the content
    /// was loading.
    pub fn finish(&self, editor: &mut dyn Editor, loaded: LoadedContent) -> ChordOutcome {
        let start = editor.cursor();
        editor.replace_range(&loaded.insertion.text, start, start);

        let cursor = start.advance(loaded.insertion.before_cursor());
        editor.set_cursor(cursor);

        info!(path = %loaded.path, "content chord inserted file");
        ChordOutcome::ContentInserted {
            path: loaded.path,
            cursor,
        }
    }
}

/// Deletes the `trigger` characters immediately before the cursor
fn remove_trigger(editor: &mut dyn Editor, trigger: &str) {
    let cursor = editor.cursor();
    let from = cursor.back(trigger.chars().count());
    editor.replace_range("", from, cursor);
    editor.set_cursor(from);
}

#[cfg(test)]
mod tests;
