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

//! Async event loop around [`ChordEngine`]
//!
//! One task owns the engine and the editor. It waits on three things at
//! once:
//!
//! - the next [`EditorEvent`] from the channel
//! - the accumulator's flush deadline, if one is scheduled
//! - finished content jobs, which run on tokio's blocking pool
//!
//! Because only this task touches the editor, content read in the
//! background is applied here, at whatever the cursor is by then.

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::core::accumulator::KeyEvent;
use crate::core::types::ChordDefinition;
use crate::dispatch::host::Editor;
use crate::dispatch::{ChordOutcome, DispatchError, LoadedContent};
use crate::engine::{ChordEngine, Fired, PendingChord};

/// Input delivered to the runtime by the host
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EditorEvent {
    /// A keydown in the editor
    Key(KeyEvent),
    /// The editor gained (`true`) or lost (`false`) focus
    Focus(bool),
    /// Stop after in-flight content jobs finish
    Shutdown,
}

/// Every chord that completed or failed, in completion order
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<Result<ChordOutcome, DispatchError>>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

type JobResult = (ChordDefinition, Result<LoadedContent, DispatchError>);

/// Drives `engine` until [`EditorEvent::Shutdown`] arrives or every sender
/// is dropped
///
/// A flush still pending at shutdown is cancelled. Content jobs already
/// started are awaited and applied.
pub async fn run<E: Editor>(
    engine: &mut ChordEngine,
    editor: &mut E,
    mut events: mpsc::Receiver<EditorEvent>,
) -> RunReport {
    let mut report = RunReport::default();
    let mut jobs: JoinSet<JobResult> = JoinSet::new();
    let mut focused = editor.has_focus();

    loop {
        let deadline = engine.deadline();
        let wake_at = deadline.map(Instant::from_std).unwrap_or_else(Instant::now);

        tokio::select! {
            event = events.recv() => match event {
                Some(EditorEvent::Key(key)) => {
                    if focused {
                        engine.handle_key(&key, &*editor, now());
                    } else {
                        debug!(?key, "key ignored while unfocused");
                    }
                }
                Some(EditorEvent::Focus(true)) => focused = true,
                Some(EditorEvent::Focus(false)) => {
                    focused = false;
                    engine.focus_lost();
                }
                Some(EditorEvent::Shutdown) | None => break,
            },
            _ = sleep_until(wake_at), if deadline.is_some() => {
                if let Some(fired) = engine.poll(&mut *editor, now()) {
                    match fired {
                        Fired::Done(outcome) => report.outcomes.push(Ok(outcome)),
                        Fired::Failed(err) => report.outcomes.push(Err(err)),
                        Fired::Pending(PendingChord { chord, job }) => {
                            debug!(path = %job.path(), "reading chord content");
                            jobs.spawn_blocking(move || {
                                let loaded = job.run();
                                (chord, loaded)
                            });
                        }
                    }
                }
            },
            Some(joined) = jobs.join_next(), if !jobs.is_empty() => {
                report.outcomes.push(complete(engine, editor, joined));
            },
        }
    }

    engine.shutdown();

    while let Some(joined) = jobs.join_next().await {
        report.outcomes.push(complete(engine, editor, joined));
    }

    report
}

fn complete<E: Editor>(
    engine: &ChordEngine,
    editor: &mut E,
    joined: Result<JobResult, tokio::task::JoinError>,
) -> Result<ChordOutcome, DispatchError> {
    match joined {
        Ok((chord, loaded)) => engine.complete(editor, &chord, loaded),
        Err(e) => {
            warn!(error = %e, "content job did not finish");
            let err = DispatchError::Host(e.to_string());
            engine.dispatcher().notify(&err.to_string());
            Err(err)
        }
    }
}

/// Current time on tokio's clock, so a paused test clock applies
fn now() -> std::time::Instant {
    Instant::now().into_std()
}
