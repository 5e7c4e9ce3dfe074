// Service module exports

pub mod aggregate;
pub mod config;
pub mod database;
pub mod gesture;
pub mod room;
pub mod room_sync;
pub mod save_queue;
pub mod session;
