// Parameterized drag scenarios and slot labels
mod fixtures;

use fixtures::keys;
use moim::models::slot::{GridConfig, SlotKey};
use moim::services::gesture::{GestureCommand, SlotGrid};
use moim::utils::slot_time::SlotTimeCodec;
use pretty_assertions::assert_eq;
use test_case::test_case;

fn key(raw: &str) -> SlotKey {
    raw.parse().expect("valid slot key")
}

#[test_case(&[], "0-0", &["0-1", "0-2"], &["0-0", "0-1", "0-2"]; "paint down a column")]
#[test_case(&["0-0", "0-1", "0-2"], "0-1", &["0-2", "0-3"], &["0-0"]; "erase from a selected cell")]
#[test_case(&["0-1"], "0-0", &["0-1", "0-2"], &["0-0", "0-1", "0-2"]; "painting over selected cells keeps them")]
#[test_case(&[], "0-0", &["0-1", "0-0", "0-1"], &["0-0", "0-1"]; "dragging back and forth")]
#[test_case(&["1-5"], "1-5", &[], &[]; "single tap clears a cell")]
#[test_case(&[], "0-3", &["1-3", "2-3"], &["0-3", "1-3", "2-3"]; "drag across days")]
fn test_drag_scenarios(initial: &[&str], start: &str, path: &[&str], expected: &[&str]) {
    let mut grid = SlotGrid::new(keys(initial));

    assert_eq!(grid.apply(GestureCommand::Begin(key(start))), None);
    for cell in path {
        assert_eq!(grid.apply(GestureCommand::Move(key(cell))), None);
    }
    let committed = grid.apply(GestureCommand::End);

    assert_eq!(committed, Some(keys(expected)));
    assert!(!grid.is_dragging());
}

#[test]
fn test_begin_without_release_commits_previous_drag() {
    let mut grid = SlotGrid::default();
    grid.apply(GestureCommand::Begin(key("0-0")));
    grid.apply(GestureCommand::Move(key("0-1")));

    // The release of the first drag never arrived.
    let previous = grid.apply(GestureCommand::Begin(key("3-3")));
    assert_eq!(previous, Some(keys(&["0-0", "0-1"])));

    let committed = grid.apply(GestureCommand::End);
    assert_eq!(committed, Some(keys(&["0-0", "0-1", "3-3"])));
}

#[test]
fn test_stray_moves_and_ends_are_ignored() {
    let mut grid = SlotGrid::new(keys(&["2-2"]));
    assert_eq!(grid.apply(GestureCommand::Move(key("0-0"))), None);
    assert_eq!(grid.apply(GestureCommand::End), None);
    assert_eq!(grid.selection(), &keys(&["2-2"]));
}

#[test_case(0, "9:00"; "first slot")]
#[test_case(1, "9:30"; "half past")]
#[test_case(29, "23:30"; "last slot")]
fn test_row_labels(slot: u16, expected: &str) {
    let config = GridConfig::default();
    assert_eq!(SlotTimeCodec::new(&config).row_label(slot), expected);
}

#[test_case("0-0", 3, "월 9:00 ~ 9:30 (3명)"; "monday morning")]
#[test_case("4-19", 2, "금 18:30 ~ 19:00 (2명)"; "friday evening")]
#[test_case("6-29", 1, "일 23:30 ~ 24:00 (1명)"; "ends at midnight")]
fn test_slot_descriptions(raw: &str, count: usize, expected: &str) {
    let config = GridConfig::default();
    assert_eq!(SlotTimeCodec::new(&config).format_key(key(raw), count), expected);
}
