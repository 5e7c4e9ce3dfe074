// Module exports for models

pub mod room;
pub mod selection;
pub mod session;
pub mod slot;
