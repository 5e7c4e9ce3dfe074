pub mod palette;
pub mod slot_grid;

pub use palette::HeatPalette;
pub use slot_grid::{GridLayout, PointerSample, PointerTracker, SlotGridOutput, SlotGridView};
