//! Boundary to the shared room store.
//!
//! The room view reads every member's selection through
//! [`RoomSync::subscribe_all_selections`] and writes the local member's
//! selection through [`RoomSync::save_selection`]. Each save carries the
//! complete set and a revision; stores keep the highest revision per
//! member, so saves that complete out of order still converge.

mod memory;
mod revision;
mod sqlite;
mod subscribers;

pub use memory::InMemoryRoomSync;
pub use revision::RevisionClock;
pub use sqlite::SqliteRoomSync;
pub use subscribers::Subscription;

use thiserror::Error;

use crate::models::selection::{MemberSelection, SelectionSet};

/// Receives the full member-selection snapshot of a room, once on
/// subscribe and again after every change. Must not call back into the
/// store that invoked it.
pub type SelectionCallback = Box<dyn FnMut(&[MemberSelection]) + Send>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("room store is unavailable: {0}")]
    Unavailable(String),
    #[error("room '{0}' does not exist in the store")]
    UnknownRoom(String),
    #[error("room store error: {0}")]
    Storage(String),
}

impl SyncError {
    /// Whether trying the same call again later can succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SyncError::UnknownRoom(_))
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait RoomSync {
    /// Registers `callback` for `room_code` and invokes it immediately
    /// with the current snapshot. Dropping the returned handle
    /// unsubscribes.
    fn subscribe_all_selections(
        &self,
        room_code: &str,
        callback: SelectionCallback,
    ) -> Result<Subscription, SyncError>;

    /// Stores `selection` as the complete replacement for the member's
    /// previous selection, unless the store already holds a newer
    /// revision for that member.
    fn save_selection(
        &self,
        room_code: &str,
        member_id: &str,
        selection: &SelectionSet,
        revision: i64,
    ) -> Result<(), SyncError>;

    /// Picks up changes made outside this process. Push-based stores
    /// have nothing to do here.
    fn poll(&self) -> Result<(), SyncError> {
        Ok(())
    }
}
