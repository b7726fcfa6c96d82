//! Value suggestions for Command and File chords
//!
//! Filtering is a case-insensitive substring match and keeps the
//! collaborator's own order. An empty query returns everything.

use super::host::{Action, ActionRegistry, ContentStore};

fn matches(candidate: &str, query: &str) -> bool {
    candidate.to_lowercase().contains(&query.to_lowercase())
}

/// Host actions whose display name contains `query`
pub fn suggest_commands(actions: &dyn ActionRegistry, query: &str) -> Vec<Action> {
    actions
        .list_actions()
        .into_iter()
        .filter(|action| matches(&action.name, query))
        .collect()
}

/// Content paths containing `query`
pub fn suggest_files(content: &dyn ContentStore, query: &str) -> Vec<String> {
    content
        .list_paths()
        .into_iter()
        .filter(|path| matches(path, query))
        .collect()
}
