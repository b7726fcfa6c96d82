use std::fs;
use tempfile::TempDir;

use crate::dispatch::host::{ActionRegistry, ContentStore, Editor, Notifier, Position};
use crate::dispatch::memory::{
    MemoryActions, MemoryContentStore, MemoryEditor, RecordingNotifier, SharedEditor, VaultStore,
};
use crate::dispatch::suggest::{suggest_commands, suggest_files};

/// Helper: vault with a nested file and one file outside it
fn create_test_vault() -> (TempDir, VaultStore) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("vault");
    fs::create_dir_all(root.join("snippets/work")).unwrap();
    fs::write(root.join("snippets/sig.md"), "-- \nRegards").unwrap();
    fs::write(root.join("snippets/work/standup.md"), "Yesterday:\nToday:").unwrap();
    fs::write(root.join("Daily.md"), "# {{date}}").unwrap();
    fs::write(temp_dir.path().join("secret.txt"), "outside").unwrap();

    (temp_dir, VaultStore::new(root))
}

#[test]
fn test_memory_editor_multiline_replace() {
    let mut editor = MemoryEditor::new("one\ntwo\nthree");
    assert_eq!(editor.cursor(), Position::new(2, 5));

    editor.replace_range("2", Position::new(1, 0), Position::new(1, 3));

    assert_eq!(editor.text(), "one\n2\nthree");
    assert_eq!(editor.cursor(), Position::new(2, 5));
}

#[test]
fn test_memory_editor_cursor_inside_replaced_range() {
    let mut editor = MemoryEditor::new("abcdef");
    editor.set_cursor(Position::new(0, 3));

    editor.replace_range("XY", Position::new(0, 1), Position::new(0, 5));

    assert_eq!(editor.text(), "aXYf");
    assert_eq!(editor.cursor(), Position::new(0, 1));
}

#[test]
fn test_memory_editor_clamps_cursor() {
    let mut editor = MemoryEditor::new("ab\ncd");

    editor.set_cursor(Position::new(0, 40));
    assert_eq!(editor.cursor(), Position::new(0, 2));

    editor.set_cursor(Position::new(9, 0));
    assert_eq!(editor.cursor(), Position::new(1, 2));
}

#[test]
fn test_memory_editor_type_text_and_focus() {
    let mut editor = MemoryEditor::new("");
    editor.type_text("héllo");
    assert_eq!(editor.render_with_cursor(), "héllo|");

    assert!(editor.has_focus());
    editor.set_focus(false);
    assert!(!editor.has_focus());
}

#[test]
fn test_shared_editor_sees_both_sides() {
    let typist = SharedEditor::new(MemoryEditor::new("").with_file_path("notes/a.md"));
    let mut runtime_side = typist.clone();

    typist.with(|editor| editor.type_text("ab"));
    let end = runtime_side.cursor();
    runtime_side.replace_range("xyz", Position::new(0, 0), end);

    assert_eq!(typist.snapshot().render_with_cursor(), "xyz|");
    assert_eq!(runtime_side.file_path().as_deref(), Some("notes/a.md"));
    assert!(runtime_side.has_focus());
}

#[test]
fn test_memory_actions_records_invocations() {
    let actions = MemoryActions::from_names(["Toggle bold", "Insert   Table"]);

    let ids: Vec<String> = actions.list_actions().into_iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["chords:toggle-bold", "chords:insert-table"]);

    actions.invoke("chords:toggle-bold").unwrap();
    assert!(actions.invoke("chords:missing").is_err());
    assert_eq!(actions.invoked(), vec!["chords:toggle-bold"]);
}

#[test]
fn test_vault_resolves_relative_paths() {
    let (_temp_dir, vault) = create_test_vault();

    let handle = vault.resolve("snippets/sig.md").unwrap();
    assert_eq!(vault.read_text(&handle).unwrap(), "-- \nRegards");

    assert!(vault.resolve("snippets/none.md").is_none());
    assert!(vault.resolve("snippets").is_none(), "directories are not content");
}

#[test]
fn test_vault_rejects_paths_outside_root() {
    let (temp_dir, vault) = create_test_vault();

    assert!(vault.resolve("../secret.txt").is_none());
    assert!(vault.resolve("snippets/../../secret.txt").is_none());

    let absolute = temp_dir.path().join("secret.txt");
    assert!(vault.resolve(absolute.to_str().unwrap()).is_none());
    assert!(vault.resolve("").is_none());
}

#[test]
fn test_vault_lists_files_sorted() {
    let (_temp_dir, vault) = create_test_vault();

    assert_eq!(
        vault.list_paths(),
        vec!["Daily.md", "snippets/sig.md", "snippets/work/standup.md"]
    );
}

#[test]
fn test_suggest_files_case_insensitive() {
    let (_temp_dir, vault) = create_test_vault();

    assert_eq!(suggest_files(&vault, "WORK"), vec!["snippets/work/standup.md"]);
    assert_eq!(suggest_files(&vault, "").len(), 3);
    assert!(suggest_files(&vault, "zzz").is_empty());
}

#[test]
fn test_suggest_commands_keeps_registry_order() {
    let actions = MemoryActions::from_names(["Toggle bold", "Save file", "Toggle italics"]);

    let names: Vec<String> = suggest_commands(&actions, "toggle")
        .into_iter()
        .map(|a| a.name)
        .collect();

    assert_eq!(names, vec!["Toggle bold", "Toggle italics"]);
}

#[test]
fn test_memory_content_store() {
    let store = MemoryContentStore::new().with_file("b.md", "B").with_file("a.md", "A");

    assert_eq!(store.list_paths(), vec!["a.md", "b.md"]);
    let handle = store.resolve("a.md").unwrap();
    assert_eq!(store.read_text(&handle).unwrap(), "A");
    assert!(store.resolve("c.md").is_none());
}

#[test]
fn test_recording_notifier_take() {
    let notifier = RecordingNotifier::new();
    notifier.notify("first");
    notifier.notify("second");

    assert_eq!(notifier.take(), vec!["first", "second"]);
    assert!(notifier.messages().is_empty());
}
