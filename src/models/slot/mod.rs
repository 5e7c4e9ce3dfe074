// Slot model
// Grid geometry and the canonical "{day}-{slot}" cell identifier

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_START_HOUR: u32 = 9;
pub const DEFAULT_END_HOUR: u32 = 24;
pub const DEFAULT_SLOTS_PER_HOUR: u32 = 2;
pub const DEFAULT_DAY_LABELS: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

/// One cell of the weekly grid: a day column and a slot row.
///
/// Ordering is day-major, so a sorted collection of keys reads like the
/// grid itself: Monday top to bottom, then Tuesday, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub day: u8,
    pub slot: u16,
}

impl SlotKey {
    pub const fn new(day: u8, slot: u16) -> Self {
        Self { day, slot }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotKeyParseError {
    #[error("slot key '{0}' is not in day-slot form")]
    MissingSeparator(String),
    #[error("slot key '{0}' has an invalid day index")]
    InvalidDay(String),
    #[error("slot key '{0}' has an invalid slot index")]
    InvalidSlot(String),
}

impl FromStr for SlotKey {
    type Err = SlotKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, slot) = s
            .split_once('-')
            .ok_or_else(|| SlotKeyParseError::MissingSeparator(s.to_string()))?;

        let day =
            parse_digits::<u8>(day).ok_or_else(|| SlotKeyParseError::InvalidDay(s.to_string()))?;
        let slot =
            parse_digits::<u16>(slot).ok_or_else(|| SlotKeyParseError::InvalidSlot(s.to_string()))?;

        Ok(Self { day, slot })
    }
}

/// Canonical decimal only: ASCII digits, no sign, no leading zero, so a
/// parsed key always prints back to the same text.
fn parse_digits<T: FromStr>(raw: &str) -> Option<T> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if raw.len() > 1 && raw.starts_with('0') {
        return None;
    }
    raw.parse().ok()
}

impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Fixed geometry of the availability grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub start_hour: u32,
    pub end_hour: u32,
    pub slots_per_hour: u32,
    pub day_labels: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            slots_per_hour: DEFAULT_SLOTS_PER_HOUR,
            day_labels: DEFAULT_DAY_LABELS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.start_hour >= self.end_hour {
            return Err("Grid start hour must be before end hour".to_string());
        }

        if self.end_hour > 24 {
            return Err("Grid end hour cannot be later than 24".to_string());
        }

        if self.slots_per_hour == 0 || 60 % self.slots_per_hour != 0 {
            return Err("Slots per hour must evenly divide 60 minutes".to_string());
        }

        if self.day_labels.is_empty() || self.day_labels.len() > usize::from(u8::MAX) {
            return Err("Grid needs between 1 and 255 day labels".to_string());
        }

        Ok(())
    }

    pub fn days(&self) -> usize {
        self.day_labels.len()
    }

    pub fn slots_per_day(&self) -> u16 {
        ((self.end_hour - self.start_hour) * self.slots_per_hour) as u16
    }

    pub fn slot_minutes(&self) -> u32 {
        60 / self.slots_per_hour
    }

    pub fn contains(&self, key: SlotKey) -> bool {
        usize::from(key.day) < self.days() && key.slot < self.slots_per_day()
    }

    pub fn day_label(&self, day: u8) -> Option<&str> {
        self.day_labels.get(usize::from(day)).map(String::as_str)
    }

    /// Every key in the grid, day-major.
    pub fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        let slots = self.slots_per_day();
        (0..self.days() as u8).flat_map(move |day| (0..slots).map(move |slot| SlotKey::new(day, slot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_key_display_matches_wire_form() {
        assert_eq!(SlotKey::new(0, 0).to_string(), "0-0");
        assert_eq!(SlotKey::new(6, 29).to_string(), "6-29");
    }

    #[test]
    fn test_slot_key_parse() {
        assert_eq!("3-17".parse::<SlotKey>(), Ok(SlotKey::new(3, 17)));
    }

    #[test]
    fn test_slot_key_parse_rejects_garbage() {
        assert_eq!(
            "317".parse::<SlotKey>(),
            Err(SlotKeyParseError::MissingSeparator("317".to_string()))
        );
        assert!(matches!(
            "x-1".parse::<SlotKey>(),
            Err(SlotKeyParseError::InvalidDay(_))
        ));
        assert!(matches!(
            "1-".parse::<SlotKey>(),
            Err(SlotKeyParseError::InvalidSlot(_))
        ));
        assert!("-1-2".parse::<SlotKey>().is_err());
    }

    #[test]
    fn test_slot_key_parse_rejects_signs_and_spaces() {
        for raw in ["+1-2", "1-+2", " 1-2", "1- 2", "-1-2", "01-2", "1-002"] {
            assert!(raw.parse::<SlotKey>().is_err(), "{} should not parse", raw);
        }
        assert_eq!("0-0".parse::<SlotKey>(), Ok(SlotKey::new(0, 0)));
        assert_eq!("10-20".parse::<SlotKey>().unwrap().to_string(), "10-20");
    }

    #[test]
    fn test_slot_key_serializes_as_string() {
        let json = serde_json::to_string(&SlotKey::new(1, 2)).unwrap();
        assert_eq!(json, "\"1-2\"");

        let key: SlotKey = serde_json::from_str("\"4-11\"").unwrap();
        assert_eq!(key, SlotKey::new(4, 11));
    }

    #[test]
    fn test_slot_key_orders_day_major() {
        let mut keys = vec![SlotKey::new(1, 0), SlotKey::new(0, 5), SlotKey::new(0, 1)];
        keys.sort();
        assert_eq!(
            keys,
            vec![SlotKey::new(0, 1), SlotKey::new(0, 5), SlotKey::new(1, 0)]
        );
    }

    #[test]
    fn test_default_grid_geometry() {
        let config = GridConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.days(), 7);
        assert_eq!(config.slots_per_day(), 30);
        assert_eq!(config.slot_minutes(), 30);
        assert_eq!(config.keys().count(), 210);
        assert_eq!(config.day_label(0), Some("월"));
        assert_eq!(config.day_label(7), None);
    }

    #[test]
    fn test_grid_contains() {
        let config = GridConfig::default();
        assert!(config.contains(SlotKey::new(6, 29)));
        assert!(!config.contains(SlotKey::new(7, 0)));
        assert!(!config.contains(SlotKey::new(0, 30)));
    }

    #[test]
    fn test_grid_validation() {
        let inverted = GridConfig {
            start_hour: 18,
            end_hour: 9,
            ..GridConfig::default()
        };
        assert!(inverted.validate().is_err());

        let uneven = GridConfig {
            slots_per_hour: 7,
            ..GridConfig::default()
        };
        assert!(uneven.validate().is_err());

        let no_days = GridConfig {
            day_labels: Vec::new(),
            ..GridConfig::default()
        };
        assert!(no_days.validate().is_err());

        let quarter_hours = GridConfig {
            start_hour: 8,
            end_hour: 20,
            slots_per_hour: 4,
            ..GridConfig::default()
        };
        assert!(quarter_hours.validate().is_ok());
        assert_eq!(quarter_hours.slots_per_day(), 48);
    }
}
