use crate::services::config::AppConfig;
use crate::services::database::Database;
use crate::services::room::RoomService;
use crate::services::room_sync::{RoomSync, SqliteRoomSync};
use crate::services::session::SessionStore;

/// Shared access point for services and resources that multiple app modules need.
pub struct AppContext {
    database: &'static Database,
    room_sync: SqliteRoomSync,
    config: AppConfig,
    session_store: SessionStore,
}

impl AppContext {
    pub fn new(
        database: &'static Database,
        room_sync: SqliteRoomSync,
        config: AppConfig,
        session_store: SessionStore,
    ) -> Self {
        Self {
            database,
            room_sync,
            config,
            session_store,
        }
    }

    pub fn room_service(&self) -> RoomService<'_> {
        RoomService::new(self.database.connection())
    }

    pub fn room_sync(&self) -> &dyn RoomSync {
        &self.room_sync
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.session_store
    }
}
