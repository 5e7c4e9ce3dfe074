//! Mapping between slot indices and wall-clock times.
//!
//! A slot index counts rows from the top of the grid; with the default
//! geometry slot 0 is 9:00 and slot 29 is 23:30. The final slot ends at
//! the grid's end hour, which may be 24:00, so times are plain
//! `(hour, minute)` pairs rather than `NaiveTime`.

use crate::models::slot::{GridConfig, SlotKey};

pub struct SlotTimeCodec<'a> {
    config: &'a GridConfig,
}

impl<'a> SlotTimeCodec<'a> {
    pub fn new(config: &'a GridConfig) -> Self {
        Self { config }
    }

    /// Start time of `slot_index`. Also valid for `slots_per_day()`,
    /// which yields the grid's end time.
    pub fn decode(&self, slot_index: u16) -> (u32, u32) {
        self.decode_index(u32::from(slot_index))
    }

    fn decode_index(&self, index: u32) -> (u32, u32) {
        let per_hour = self.config.slots_per_hour;
        let minute = (index % per_hour) * self.config.slot_minutes();
        let hour = self.config.start_hour + index / per_hour;
        (hour, minute)
    }

    /// Slot index that starts at `hour:minute`, if the time is on a slot
    /// boundary inside the grid.
    pub fn encode(&self, hour: u32, minute: u32) -> Option<u16> {
        let step = self.config.slot_minutes();
        if hour < self.config.start_hour || minute >= 60 || minute % step != 0 {
            return None;
        }

        let index = (hour - self.config.start_hour) * self.config.slots_per_hour + minute / step;
        let index = u16::try_from(index).ok()?;
        (index < self.config.slots_per_day()).then_some(index)
    }

    pub fn slot_range(&self, slot_index: u16) -> ((u32, u32), (u32, u32)) {
        let index = u32::from(slot_index);
        (self.decode_index(index), self.decode_index(index + 1))
    }

    pub fn format_time((hour, minute): (u32, u32)) -> String {
        format!("{}:{:02}", hour, minute)
    }

    /// Row label for the time column.
    pub fn row_label(&self, slot_index: u16) -> String {
        Self::format_time(self.decode(slot_index))
    }

    /// `"월 9:00 ~ 9:30 (3명)"`
    pub fn format(&self, day_index: u8, slot_index: u16, count: usize) -> String {
        let day = self
            .config
            .day_label(day_index)
            .map(str::to_string)
            .unwrap_or_else(|| day_index.to_string());
        let (start, end) = self.slot_range(slot_index);

        format!(
            "{} {} ~ {} ({}명)",
            day,
            Self::format_time(start),
            Self::format_time(end),
            count
        )
    }

    pub fn format_key(&self, key: SlotKey, count: usize) -> String {
        self.format(key.day, key.slot, count)
    }
}
