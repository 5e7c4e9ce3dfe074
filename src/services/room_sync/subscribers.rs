use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use super::{SelectionCallback, SyncError};
use crate::models::selection::MemberSelection;

struct Subscriber {
    room_code: String,
    callback: SelectionCallback,
}

/// Callbacks registered against a store, keyed by subscription id.
#[derive(Default)]
pub(super) struct SubscriberRegistry {
    next_id: u64,
    entries: HashMap<u64, Subscriber>,
}

pub(super) type SharedRegistry = Arc<Mutex<SubscriberRegistry>>;

impl SubscriberRegistry {
    pub(super) fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::default()))
    }

    fn insert(&mut self, room_code: &str, callback: SelectionCallback) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.insert(
            id,
            Subscriber {
                room_code: room_code.to_string(),
                callback,
            },
        );
        id
    }

    /// Distinct rooms with at least one live subscriber.
    pub(super) fn rooms(&self) -> Vec<String> {
        let mut rooms: Vec<String> = self
            .entries
            .values()
            .map(|s| s.room_code.clone())
            .collect();
        rooms.sort();
        rooms.dedup();
        rooms
    }

    pub(super) fn notify(&mut self, room_code: &str, snapshot: &[MemberSelection]) {
        for subscriber in self.entries.values_mut() {
            if subscriber.room_code == room_code {
                (subscriber.callback)(snapshot);
            }
        }
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}

pub(super) fn lock_registry(
    registry: &SharedRegistry,
) -> Result<std::sync::MutexGuard<'_, SubscriberRegistry>, SyncError> {
    registry
        .lock()
        .map_err(|_| SyncError::Storage("subscriber registry lock poisoned".to_string()))
}

/// Delivers the initial snapshot and registers the callback.
pub(super) fn register(
    registry: &SharedRegistry,
    room_code: &str,
    mut callback: SelectionCallback,
    snapshot: &[MemberSelection],
) -> Result<Subscription, SyncError> {
    callback(snapshot);
    let id = lock_registry(registry)?.insert(room_code, callback);
    log::debug!("Subscription {} opened for room {}", id, room_code);

    Ok(Subscription {
        id,
        room_code: room_code.to_string(),
        registry: Arc::downgrade(registry),
    })
}

/// Live subscription to a room's selections. Unsubscribes on drop.
pub struct Subscription {
    id: u64,
    room_code: String,
    registry: Weak<Mutex<SubscriberRegistry>>,
}

impl Subscription {
    /// A handle not attached to any store, for test doubles.
    pub fn detached(room_code: impl Into<String>) -> Self {
        Self {
            id: 0,
            room_code: room_code.into(),
            registry: Weak::new(),
        }
    }

    pub fn room_code(&self) -> &str {
        &self.room_code
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("room_code", &self.room_code)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let Ok(mut entries) = registry.lock() else {
            return;
        };
        entries.entries.remove(&self.id);
        log::debug!("Subscription {} closed for room {}", self.id, self.room_code);
    }
}
