//! Cross-member aggregation: per-slot counts and the top-N ranking.

use std::collections::BTreeMap;

use crate::models::selection::{MemberSelection, SelectionSet};
use crate::models::slot::{GridConfig, SlotKey};

pub const DEFAULT_TOP_N: usize = 3;

/// Number of members available in each slot. Slots nobody picked are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heatmap {
    counts: BTreeMap<SlotKey, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedSlot {
    pub slot: SlotKey,
    pub count: usize,
}

impl Heatmap {
    pub fn count(&self, key: SlotKey) -> usize {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, usize)> + '_ {
        self.counts.iter().map(|(key, count)| (*key, *count))
    }

    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    pub fn top_n(&self, n: usize) -> Vec<RankedSlot> {
        top_n(self, n)
    }
}

impl FromIterator<(SlotKey, usize)> for Heatmap {
    fn from_iter<I: IntoIterator<Item = (SlotKey, usize)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().filter(|(_, count)| *count > 0).collect(),
        }
    }
}

/// Counts, for every slot, how many of the given selections contain it.
/// The result does not depend on the order of `selections`.
pub fn compute_heatmap<'a, I>(selections: I) -> Heatmap
where
    I: IntoIterator<Item = &'a SelectionSet>,
{
    let mut counts = BTreeMap::new();
    for selection in selections {
        for key in selection.iter() {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    Heatmap { counts }
}

/// Highest-count slots first. Ties keep the heatmap's slot order
/// (day, then time), so equal input always ranks the same way.
pub fn top_n(heatmap: &Heatmap, n: usize) -> Vec<RankedSlot> {
    let mut ranked: Vec<RankedSlot> = heatmap
        .iter()
        .map(|(slot, count)| RankedSlot { slot, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Heatmap for the room view: the store's snapshot with the local
/// member's entry replaced by their latest local selection.
///
/// The snapshot and the local selection are kept apart until here, so a
/// remote update arriving mid-drag never touches the drag itself. Keys
/// outside `grid` (stored by a client with a different grid) are not
/// counted, so they never reach the ranking.
pub fn room_heatmap(
    snapshot: &[MemberSelection],
    local_member_id: &str,
    local_selection: &SelectionSet,
    grid: &GridConfig,
) -> Heatmap {
    let others = snapshot
        .iter()
        .filter(|entry| entry.member_id != local_member_id)
        .map(|entry| &entry.slots);
    let mut heatmap = compute_heatmap(others.chain(std::iter::once(local_selection)));
    heatmap.counts.retain(|key, _| grid.contains(*key));
    heatmap
}

/// Fill strength in `0.0..=1.0`, saturating once `count` reaches `cap`.
pub fn intensity(count: usize, cap: usize) -> f32 {
    if cap == 0 || count == 0 {
        return 0.0;
    }
    count.min(cap) as f32 / cap as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(raw: &str) -> SlotKey {
        raw.parse().unwrap()
    }

    fn keys(raw: &[&str]) -> SelectionSet {
        raw.iter().map(|k| key(k)).collect()
    }

    fn ranked(raw: &str, count: usize) -> RankedSlot {
        RankedSlot {
            slot: key(raw),
            count,
        }
    }

    #[test]
    fn test_two_member_scenario() {
        let a = keys(&["0-0", "0-1"]);
        let b = keys(&["0-0"]);
        let heatmap = compute_heatmap([&a, &b]);

        assert_eq!(heatmap.count(key("0-0")), 2);
        assert_eq!(heatmap.count(key("0-1")), 1);
        assert_eq!(heatmap.count(key("0-2")), 0);
        assert_eq!(heatmap.len(), 2);
        assert_eq!(
            heatmap.top_n(3),
            vec![ranked("0-0", 2), ranked("0-1", 1)]
        );
    }

    #[test]
    fn test_empty_collection() {
        let heatmap = compute_heatmap(std::iter::empty::<&SelectionSet>());
        assert!(heatmap.is_empty());
        assert_eq!(heatmap.max_count(), 0);
        assert!(top_n(&heatmap, 3).is_empty());
    }

    #[test]
    fn test_order_independent() {
        let a = keys(&["0-0", "1-1"]);
        let b = keys(&["1-1", "2-2"]);
        let c = keys(&["0-0"]);
        assert_eq!(compute_heatmap([&a, &b, &c]), compute_heatmap([&c, &a, &b]));
    }

    #[test]
    fn test_top_n_ties_are_stable() {
        let heatmap: Heatmap = [(key("2-4"), 1), (key("1-2"), 3), (key("0-0"), 3)]
            .into_iter()
            .collect();

        let first = heatmap.top_n(2);
        assert_eq!(first, vec![ranked("0-0", 3), ranked("1-2", 3)]);
        for _ in 0..10 {
            assert_eq!(heatmap.top_n(2), first);
        }
    }

    #[test]
    fn test_top_n_with_fewer_slots_than_requested() {
        let heatmap: Heatmap = [(key("3-3"), 1)].into_iter().collect();
        assert_eq!(heatmap.top_n(3), vec![ranked("3-3", 1)]);
        assert!(heatmap.top_n(0).is_empty());
    }

    #[test]
    fn test_zero_counts_are_not_stored() {
        let heatmap: Heatmap = [(key("0-0"), 0), (key("0-1"), 2)].into_iter().collect();
        assert_eq!(heatmap.len(), 1);
    }

    #[test]
    fn test_room_heatmap_prefers_local_selection() {
        let snapshot = vec![
            MemberSelection::new("me", keys(&["0-0", "0-1"]), 1),
            MemberSelection::new("friend", keys(&["0-1", "0-2"]), 1),
        ];
        // Local user has since deselected 0-0 and picked 0-2; the save has not landed yet.
        let local = keys(&["0-1", "0-2"]);

        let heatmap = room_heatmap(&snapshot, "me", &local, &GridConfig::default());
        assert_eq!(heatmap.count(key("0-0")), 0);
        assert_eq!(heatmap.count(key("0-1")), 2);
        assert_eq!(heatmap.count(key("0-2")), 2);
    }

    #[test]
    fn test_room_heatmap_counts_local_before_first_save() {
        let snapshot = vec![MemberSelection::new("friend", keys(&["4-4"]), 1)];
        let heatmap = room_heatmap(&snapshot, "me", &keys(&["4-4"]), &GridConfig::default());
        assert_eq!(heatmap.count(key("4-4")), 2);
    }

    #[test]
    fn test_room_heatmap_ignores_slots_outside_grid() {
        let snapshot = vec![
            MemberSelection::new(
                "friend",
                SelectionSet::from_wire_json(r#"["0-1", "0-45", "0-65535", "9-0"]"#),
                1,
            ),
            MemberSelection::new("other", keys(&["0-45", "0-2"]), 1),
        ];
        let grid = GridConfig::default();

        let heatmap = room_heatmap(&snapshot, "me", &keys(&["0-1"]), &grid);
        assert_eq!(heatmap.len(), 2);
        assert_eq!(heatmap.count(key("0-45")), 0);
        assert_eq!(heatmap.top_n(3), vec![ranked("0-1", 2), ranked("0-2", 1)]);
        assert!(heatmap.iter().all(|(slot, _)| grid.contains(slot)));
    }

    #[test]
    fn test_intensity_saturates() {
        assert_eq!(intensity(0, 5), 0.0);
        assert_eq!(intensity(1, 5), 0.2);
        assert_eq!(intensity(5, 5), 1.0);
        assert_eq!(intensity(50, 5), 1.0);
        assert_eq!(intensity(3, 0), 0.0);
        assert!(intensity(2, 5) < intensity(3, 5));
    }
}
