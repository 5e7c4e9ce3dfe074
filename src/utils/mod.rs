pub mod hash;
pub mod slot_time;
