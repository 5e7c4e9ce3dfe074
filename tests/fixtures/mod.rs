// Test fixtures - reusable test data
// Provides consistent rooms and selections across the integration tests

#![allow(dead_code)]

use moim::models::selection::{MemberSelection, SelectionSet};
use moim::models::slot::SlotKey;
use moim::services::database::Database;
use tempfile::TempDir;

/// Builds a selection from `"day-slot"` wire keys.
pub fn keys(raw: &[&str]) -> SelectionSet {
    raw.iter()
        .map(|k| k.parse::<SlotKey>().expect("valid slot key"))
        .collect()
}

/// A database file in a fresh temporary directory. Keep the `TempDir`
/// alive for as long as the database is used.
pub fn temp_database() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("moim.db");
    let path = path.to_string_lossy().into_owned();

    let db = Database::new(&path).expect("open database");
    db.initialize_schema().expect("initialize schema");
    (dir, path)
}

/// Three members with overlapping Monday evenings.
pub fn sample_room() -> Vec<MemberSelection> {
    vec![
        MemberSelection::new("alice", keys(&["0-20", "0-21", "0-22"]), 1),
        MemberSelection::new("bob", keys(&["0-21", "0-22", "2-4"]), 1),
        MemberSelection::new("carol", keys(&["0-22", "2-4"]), 1),
    ]
}
