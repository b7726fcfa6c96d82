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

//! Stand-alone collaborators
//!
//! Implementations of the host traits that need no editor application:
//! an in-memory document (also in a shareable form), a fixed action list,
//! in-memory and on-disk content stores, and two notification sinks. The CLI's `simulate`
//! command runs on these, and so do the dispatcher and engine tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::host::{
    Action, ActionRegistry, ContentHandle, ContentStore, Editor, HostError, Notifier, Position,
};

/// Plain-text document with a single cursor
#[derive(Clone, Debug)]
pub struct MemoryEditor {
    text: String,
    cursor: Position,
    focused: bool,
    file_path: Option<String>,
}

impl Default for MemoryEditor {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemoryEditor {
    /// Creates a focused editor holding `text`, cursor at the end
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: Position::default().advance(text),
            focused: true,
            file_path: None,
        }
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Inserts `text` at the cursor and moves the cursor past it, the way
    /// typing does
    pub fn type_text(&mut self, text: &str) {
        let at = self.cursor;
        self.replace_range(text, at, at);
        self.cursor = at.advance(text);
    }

    /// Document text with `|` marking the cursor
    pub fn render_with_cursor(&self) -> String {
        let at = self.offset(self.cursor);
        format!("{}|{}", &self.text[..at], &self.text[at..])
    }

    /// Byte offset of `position`, clamped to the document
    fn offset(&self, position: Position) -> usize {
        let mut line_start = 0;
        for _ in 0..position.line {
            match self.text[line_start..].find('\n') {
                Some(newline) => line_start += newline + 1,
                None => return self.text.len(),
            }
        }

        let line_end = self.text[line_start..]
            .find('\n')
            .map(|newline| line_start + newline)
            .unwrap_or(self.text.len());

        self.text[line_start..line_end]
            .char_indices()
            .nth(position.ch)
            .map(|(byte, _)| line_start + byte)
            .unwrap_or(line_end)
    }

    fn position_at(&self, offset: usize) -> Position {
        Position::default().advance(&self.text[..offset])
    }
}

impl Editor for MemoryEditor {
    fn cursor(&self) -> Position {
        self.cursor
    }

    fn replace_range(&mut self, text: &str, from: Position, to: Position) {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        let start = self.offset(from);
        let end = self.offset(to);
        let cursor = self.offset(self.cursor);

        self.text.replace_range(start..end, text);

        // Map the cursor through the edit
        let cursor = if cursor >= end {
            cursor - (end - start) + text.len()
        } else if cursor > start {
            start
        } else {
            cursor
        };
        self.cursor = self.position_at(cursor);
    }

    fn set_cursor(&mut self, position: Position) {
        let offset = self.offset(position);
        self.cursor = self.position_at(offset);
    }

    fn has_focus(&self) -> bool {
        self.focused
    }

    fn file_path(&self) -> Option<String> {
        self.file_path.clone()
    }
}

/// A [`MemoryEditor`] shared between the task that types into it and the
/// runtime that edits it
#[derive(Clone, Debug, Default)]
pub struct SharedEditor(Arc<Mutex<MemoryEditor>>);

impl SharedEditor {
    pub fn new(editor: MemoryEditor) -> Self {
        Self(Arc::new(Mutex::new(editor)))
    }

    /// Runs `f` with exclusive access to the document
    pub fn with<R>(&self, f: impl FnOnce(&mut MemoryEditor) -> R) -> R {
        f(&mut lock(&self.0))
    }

    /// Copy of the document as it is now
    pub fn snapshot(&self) -> MemoryEditor {
        lock(&self.0).clone()
    }
}

impl Editor for SharedEditor {
    fn cursor(&self) -> Position {
        lock(&self.0).cursor()
    }

    fn replace_range(&mut self, text: &str, from: Position, to: Position) {
        lock(&self.0).replace_range(text, from, to);
    }

    fn set_cursor(&mut self, position: Position) {
        lock(&self.0).set_cursor(position);
    }

    fn has_focus(&self) -> bool {
        lock(&self.0).has_focus()
    }

    fn file_path(&self) -> Option<String> {
        lock(&self.0).file_path()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fixed list of host actions that records every invocation
#[derive(Debug, Default)]
pub struct MemoryActions {
    actions: Vec<Action>,
    invoked: Mutex<Vec<String>>,
}

impl MemoryActions {
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            invoked: Mutex::new(Vec::new()),
        }
    }

    /// Builds actions from display names, deriving ids like `chords:save-file`
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let actions = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                let slug = name
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
                    .join("-");
                Action::new(format!("chords:{}", slug), name)
            })
            .collect();
        Self::new(actions)
    }

    /// Ids invoked so far, oldest first
    pub fn invoked(&self) -> Vec<String> {
        lock(&self.invoked).clone()
    }
}

impl ActionRegistry for MemoryActions {
    fn list_actions(&self) -> Vec<Action> {
        self.actions.clone()
    }

    fn invoke(&self, id: &str) -> Result<(), HostError> {
        if !self.actions.iter().any(|action| action.id == id) {
            return Err(HostError(format!("no action with id '{}'", id)));
        }
        lock(&self.invoked).push(id.to_string());
        Ok(())
    }
}

/// Content held in a map from path to text
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    files: BTreeMap<String, String>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(path.into(), text.into());
        self
    }
}

impl ContentStore for MemoryContentStore {
    fn resolve(&self, path: &str) -> Option<ContentHandle> {
        self.files.contains_key(path).then(|| ContentHandle {
            path: path.to_string(),
        })
    }

    fn read_text(&self, handle: &ContentHandle) -> Result<String, HostError> {
        self.files
            .get(&handle.path)
            .cloned()
            .ok_or_else(|| HostError(format!("'{}' vanished before it was read", handle.path)))
    }

    fn list_paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }
}

/// Files below a root directory, addressed by `/`-separated relative paths
///
/// Absolute paths and `..` components are never resolved, so a chord value
/// cannot reach outside the root.
#[derive(Clone, Debug)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));

        if path.is_empty() || !contained {
            warn!(path, "refusing content path outside the vault");
            return None;
        }

        Some(self.root.join(relative))
    }
}

impl ContentStore for VaultStore {
    fn resolve(&self, path: &str) -> Option<ContentHandle> {
        let full = self.full_path(path)?;
        full.is_file().then(|| ContentHandle {
            path: path.to_string(),
        })
    }

    fn read_text(&self, handle: &ContentHandle) -> Result<String, HostError> {
        let full = self
            .full_path(&handle.path)
            .ok_or_else(|| HostError(format!("invalid path '{}'", handle.path)))?;

        fs::read_to_string(&full)
            .map_err(|e| HostError(format!("cannot read {}: {}", full.display(), e)))
    }

    fn list_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&self.root).ok()?;
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                Some(parts.join("/"))
            })
            .collect();

        paths.sort();
        paths
    }
}

/// Keeps every message for later inspection
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }

    /// Returns and forgets every message received so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.messages))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }
}

/// Forwards messages to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!(target: "chords::notice", "{}", message);
    }
}
