use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Local;

use super::subscribers::{lock_registry, register, SharedRegistry, SubscriberRegistry};
use super::{RoomSync, SelectionCallback, Subscription, SyncError};
use crate::models::selection::{MemberSelection, SelectionSet};

type RoomTable = HashMap<String, BTreeMap<String, MemberSelection>>;

/// Process-local room store. Clones share the same rooms, which lets
/// several simulated clients talk to each other in one process.
#[derive(Clone)]
pub struct InMemoryRoomSync {
    rooms: Arc<Mutex<RoomTable>>,
    registry: SharedRegistry,
}

impl Default for InMemoryRoomSync {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomSync {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            registry: SubscriberRegistry::shared(),
        }
    }

    /// Current selections of a room, ordered by member id.
    pub fn snapshot(&self, room_code: &str) -> Result<Vec<MemberSelection>, SyncError> {
        let rooms = self.lock_rooms()?;
        Ok(Self::snapshot_of(&rooms, room_code))
    }

    fn snapshot_of(rooms: &RoomTable, room_code: &str) -> Vec<MemberSelection> {
        rooms
            .get(room_code)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    fn lock_rooms(&self) -> Result<std::sync::MutexGuard<'_, RoomTable>, SyncError> {
        self.rooms
            .lock()
            .map_err(|_| SyncError::Storage("room table lock poisoned".to_string()))
    }
}

impl RoomSync for InMemoryRoomSync {
    fn subscribe_all_selections(
        &self,
        room_code: &str,
        callback: SelectionCallback,
    ) -> Result<Subscription, SyncError> {
        let snapshot = self.snapshot(room_code)?;
        register(&self.registry, room_code, callback, &snapshot)
    }

    fn save_selection(
        &self,
        room_code: &str,
        member_id: &str,
        selection: &SelectionSet,
        revision: i64,
    ) -> Result<(), SyncError> {
        let snapshot = {
            let mut rooms = self.lock_rooms()?;
            let members = rooms.entry(room_code.to_string()).or_default();

            if let Some(existing) = members.get(member_id) {
                if existing.revision >= revision {
                    log::debug!(
                        "Ignoring stale save for {} in {} (revision {} <= {})",
                        member_id,
                        room_code,
                        revision,
                        existing.revision
                    );
                    return Ok(());
                }
            }

            let mut entry = MemberSelection::new(member_id, selection.clone(), revision);
            entry.updated_at = Some(Local::now().to_rfc3339());
            members.insert(member_id.to_string(), entry);
            Self::snapshot_of(&rooms, room_code)
        };

        lock_registry(&self.registry)?.notify(room_code, &snapshot);
        Ok(())
    }
}
