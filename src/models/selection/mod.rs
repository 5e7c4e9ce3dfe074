// Selection model
// One member's chosen availability, and the stored record that carries it

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use super::slot::{GridConfig, SlotKey};

/// Set of slots one member marked as available.
///
/// Serialises as an unordered JSON array of `"{day}-{slot}"` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(BTreeSet<SlotKey>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: SlotKey) -> bool {
        self.0.contains(&key)
    }

    pub fn insert(&mut self, key: SlotKey) -> bool {
        self.0.insert(key)
    }

    pub fn remove(&mut self, key: SlotKey) -> bool {
        self.0.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.0.iter().copied()
    }

    /// Wire form: one `"{day}-{slot}"` string per selected slot.
    pub fn to_wire(&self) -> Vec<String> {
        self.0.iter().map(SlotKey::to_string).collect()
    }

    /// Lenient decode of a stored or transmitted selection.
    ///
    /// Anything other than an array degrades to an empty selection;
    /// array entries that are not valid slot keys are skipped.
    pub fn from_wire_value(value: &Value) -> Self {
        let Some(items) = value.as_array() else {
            if !value.is_null() {
                log::warn!("Ignoring non-array selection value: {}", value);
            }
            return Self::default();
        };

        items
            .iter()
            .filter_map(|item| {
                let raw = item.as_str()?;
                match raw.parse::<SlotKey>() {
                    Ok(key) => Some(key),
                    Err(err) => {
                        log::debug!("Skipping selection entry: {}", err);
                        None
                    }
                }
            })
            .collect()
    }

    /// Decode from JSON text, treating unparseable text as empty.
    pub fn from_wire_json(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_wire_value(&value),
            Err(err) => {
                log::warn!("Stored selection is not valid JSON: {}", err);
                Self::default()
            }
        }
    }

    /// Drops keys that fall outside the grid (e.g. after the grid shrank).
    pub fn retain_within(&mut self, config: &GridConfig) {
        self.0.retain(|key| config.contains(*key));
    }
}

impl FromIterator<SlotKey> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = SlotKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a SlotKey;
    type IntoIter = std::collections::btree_set::Iter<'a, SlotKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A member's latest saved selection as held by the room store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSelection {
    pub member_id: String,
    pub slots: SelectionSet,
    /// Last-writer-wins ordering for saves of this member.
    pub revision: i64,
    pub updated_at: Option<String>,
}

impl MemberSelection {
    pub fn new(member_id: impl Into<String>, slots: SelectionSet, revision: i64) -> Self {
        Self {
            member_id: member_id.into(),
            slots,
            revision,
            updated_at: None,
        }
    }
}
