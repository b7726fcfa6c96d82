use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::MemoryStore;
use crate::config::Settings;
use crate::core::accumulator::KeyEvent;
use crate::core::types::{ChordDefinition, ChordKind};
use crate::dispatch::host::Host;
use crate::dispatch::memory::{MemoryActions, MemoryContentStore, MemoryEditor, RecordingNotifier};
use crate::dispatch::{ChordOutcome, DispatchError, Dispatcher};
use crate::engine::runtime::{run, EditorEvent};
use crate::engine::{ChordEngine, ChordManager};

/// Helper: engine with a 50 ms quiet period
fn create_engine(chords: Vec<ChordDefinition>) -> (ChordEngine, Arc<RecordingNotifier>) {
    let settings = Settings {
        delay: 50.0,
        chords,
        ..Settings::default()
    };
    let manager = ChordManager::new(settings, Box::new(MemoryStore::default()));

    let content = Arc::new(MemoryContentStore::new().with_file("snip.md", "snippet"));
    let notifier = Arc::new(RecordingNotifier::new());
    let host = Host::new(
        Arc::new(MemoryActions::from_names(["Save current file"])),
        content,
        notifier.clone(),
    );

    (ChordEngine::new(manager, Dispatcher::new(host)), notifier)
}

fn key(c: char) -> EditorEvent {
    EditorEvent::Key(KeyEvent::Char(c))
}

/// Sends `events`, sleeping where a `None` stands, then shuts down
async fn send_all(tx: mpsc::Sender<EditorEvent>, events: Vec<Option<EditorEvent>>) {
    for event in events {
        match event {
            Some(event) => tx.send(event).await.unwrap(),
            None => tokio::time::sleep(Duration::from_millis(200)).await,
        }
    }
    tx.send(EditorEvent::Shutdown).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_chord_fires_after_quiet_period() {
    let (mut engine, _notifier) = create_engine(vec![ChordDefinition::new(
        "ab",
        "hello",
        ChordKind::Text,
    )]);
    // The editor already shows what the operator typed
    let mut editor = MemoryEditor::new("ab");
    let (tx, rx) = mpsc::channel(16);

    let (_, report) = tokio::join!(
        send_all(tx, vec![Some(key('a')), Some(key('b')), None]),
        run(&mut engine, &mut editor, rx),
    );

    assert_eq!(report.succeeded(), 1);
    assert_eq!(editor.render_with_cursor(), "hello|");
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_flush() {
    let (mut engine, _notifier) = create_engine(vec![ChordDefinition::new(
        "ab",
        "hello",
        ChordKind::Text,
    )]);
    let mut editor = MemoryEditor::new("ab");
    let (tx, rx) = mpsc::channel(16);

    let (_, report) = tokio::join!(
        send_all(tx, vec![Some(key('a')), Some(key('b'))]),
        run(&mut engine, &mut editor, rx),
    );

    assert!(report.outcomes.is_empty());
    assert_eq!(editor.text(), "ab");
    assert!(engine.deadline().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_focus_loss_discards_partial_chord() {
    let (mut engine, _notifier) = create_engine(vec![ChordDefinition::new(
        "ab",
        "hello",
        ChordKind::Text,
    )]);
    let mut editor = MemoryEditor::new("ab");
    let (tx, rx) = mpsc::channel(16);

    let events = vec![
        Some(key('a')),
        Some(EditorEvent::Focus(false)),
        Some(key('b')),
        None,
    ];
    let (_, report) = tokio::join!(send_all(tx, events), run(&mut engine, &mut editor, rx));

    assert!(report.outcomes.is_empty());
    assert_eq!(editor.text(), "ab");
}

#[tokio::test(start_paused = true)]
async fn test_focus_regained_accepts_keys() {
    let (mut engine, _notifier) = create_engine(vec![ChordDefinition::new(
        "ab",
        "hello",
        ChordKind::Text,
    )]);
    let mut editor = MemoryEditor::new("ab");
    let (tx, rx) = mpsc::channel(16);

    let events = vec![
        Some(EditorEvent::Focus(false)),
        Some(key('z')),
        Some(EditorEvent::Focus(true)),
        Some(key('a')),
        Some(key('b')),
        None,
    ];
    let (_, report) = tokio::join!(send_all(tx, events), run(&mut engine, &mut editor, rx));

    assert_eq!(report.succeeded(), 1);
    assert_eq!(editor.text(), "hello");
}

#[tokio::test(start_paused = true)]
async fn test_file_content_loads_in_background() {
    let (mut engine, notifier) = create_engine(vec![ChordDefinition::new(
        "fi",
        "snip.md",
        ChordKind::File,
    )]);
    engine
        .manager_mut()
        .set_notice(ChordKind::File, true)
        .unwrap();
    let mut editor = MemoryEditor::new("fi");
    let (tx, rx) = mpsc::channel(16);

    let (_, report) = tokio::join!(
        send_all(tx, vec![Some(key('f')), Some(key('i')), None]),
        run(&mut engine, &mut editor, rx),
    );

    assert_eq!(report.outcomes.len(), 1);
    assert!(matches!(
        &report.outcomes[0],
        Ok(ChordOutcome::ContentInserted { path, .. }) if path == "snip.md"
    ));
    assert_eq!(editor.text(), "snippet");
    assert_eq!(notifier.messages(), vec!["File Chord Executed: fi"]);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_reported() {
    let (mut engine, notifier) = create_engine(vec![
        ChordDefinition::new("xy", "Missing command", ChordKind::Command),
        ChordDefinition::new("sv", "Save current file", ChordKind::Command),
    ]);
    let mut editor = MemoryEditor::new("xysv");
    let (tx, rx) = mpsc::channel(16);

    let events = vec![Some(key('x')), Some(key('y')), None, Some(key('s')), Some(key('v')), None];
    let (_, report) = tokio::join!(send_all(tx, events), run(&mut engine, &mut editor, rx));

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(
        report.outcomes[0],
        Err(DispatchError::CommandNotFound("Missing command".to_string()))
    );
    assert_eq!(
        notifier.messages(),
        vec!["Command not found: Missing command", "Command Chord Executed: sv"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_closed_channel_stops_runtime() {
    let (mut engine, _notifier) = create_engine(Vec::new());
    let mut editor = MemoryEditor::new("");
    let (tx, rx) = mpsc::channel::<EditorEvent>(1);
    drop(tx);

    let report = run(&mut engine, &mut editor, rx).await;

    assert!(report.outcomes.is_empty());
}
