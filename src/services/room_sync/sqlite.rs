use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use chrono::Local;
use rusqlite::{params, Connection, ErrorCode};

use super::subscribers::{lock_registry, register, SharedRegistry, SubscriberRegistry};
use super::{RoomSync, SelectionCallback, Subscription, SyncError};
use crate::models::selection::{MemberSelection, SelectionSet};
use crate::services::database::Database;

/// Cheap summary of a room's availability rows, used to notice writes
/// made by other clients sharing the database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RoomFingerprint {
    rows: i64,
    revision_sum: i64,
    latest_revision: i64,
}

/// Room store backed by a (possibly shared) SQLite file.
pub struct SqliteRoomSync {
    db: Mutex<Database>,
    registry: SharedRegistry,
    fingerprints: Mutex<HashMap<String, RoomFingerprint>>,
}

impl SqliteRoomSync {
    pub fn open(path: &str) -> Result<Self> {
        let db = Database::new(path)?;
        db.initialize_schema()?;
        Ok(Self::from_database(db))
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            db: Mutex::new(db),
            registry: SubscriberRegistry::shared(),
            fingerprints: Mutex::new(HashMap::new()),
        }
    }

    pub fn snapshot(&self, room_code: &str) -> Result<Vec<MemberSelection>, SyncError> {
        let db = self.lock_db()?;
        load_snapshot(db.connection(), room_code).map_err(map_sqlite_error)
    }

    /// Reloads `room_code` and notifies subscribers if its rows changed
    /// since the last time this store looked.
    fn refresh_room(&self, room_code: &str, force: bool) -> Result<bool, SyncError> {
        let (fingerprint, snapshot) = {
            let db = self.lock_db()?;
            let fingerprint = fingerprint(db.connection(), room_code).map_err(map_sqlite_error)?;

            let unchanged = self
                .lock_fingerprints()?
                .get(room_code)
                .is_some_and(|known| *known == fingerprint);
            if unchanged && !force {
                return Ok(false);
            }

            let snapshot = load_snapshot(db.connection(), room_code).map_err(map_sqlite_error)?;
            (fingerprint, snapshot)
        };

        self.lock_fingerprints()?
            .insert(room_code.to_string(), fingerprint);
        lock_registry(&self.registry)?.notify(room_code, &snapshot);
        Ok(true)
    }

    fn lock_db(&self) -> Result<std::sync::MutexGuard<'_, Database>, SyncError> {
        self.db
            .lock()
            .map_err(|_| SyncError::Storage("database lock poisoned".to_string()))
    }

    fn lock_fingerprints(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, RoomFingerprint>>, SyncError> {
        self.fingerprints
            .lock()
            .map_err(|_| SyncError::Storage("fingerprint lock poisoned".to_string()))
    }
}

impl RoomSync for SqliteRoomSync {
    fn subscribe_all_selections(
        &self,
        room_code: &str,
        callback: SelectionCallback,
    ) -> Result<Subscription, SyncError> {
        let (fingerprint, snapshot) = {
            let db = self.lock_db()?;
            let conn = db.connection();
            let fingerprint = fingerprint(conn, room_code).map_err(map_sqlite_error)?;
            let snapshot = load_snapshot(conn, room_code).map_err(map_sqlite_error)?;
            (fingerprint, snapshot)
        };

        self.lock_fingerprints()?
            .insert(room_code.to_string(), fingerprint);
        log::info!(
            "Subscribed to room {} ({} members with selections)",
            room_code,
            snapshot.len()
        );
        register(&self.registry, room_code, callback, &snapshot)
    }

    fn save_selection(
        &self,
        room_code: &str,
        member_id: &str,
        selection: &SelectionSet,
        revision: i64,
    ) -> Result<(), SyncError> {
        let slots = serde_json::to_string(selection)
            .map_err(|err| SyncError::Storage(format!("failed to encode selection: {}", err)))?;

        let changed = {
            let db = self.lock_db()?;
            db.connection()
                .execute(
                    "INSERT INTO availability (room_code, member_id, slots, revision, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(room_code, member_id) DO UPDATE SET
                         slots = excluded.slots,
                         revision = excluded.revision,
                         updated_at = excluded.updated_at
                     WHERE excluded.revision > availability.revision",
                    params![
                        room_code,
                        member_id,
                        slots,
                        revision,
                        Local::now().to_rfc3339()
                    ],
                )
                .map_err(|err| match err {
                    rusqlite::Error::SqliteFailure(e, _)
                        if e.code == ErrorCode::ConstraintViolation =>
                    {
                        SyncError::UnknownRoom(room_code.to_string())
                    }
                    other => map_sqlite_error(other),
                })?
        };

        if changed == 0 {
            log::debug!(
                "Ignoring stale save for {} in {} (revision {})",
                member_id,
                room_code,
                revision
            );
            return Ok(());
        }

        self.refresh_room(room_code, true)?;
        Ok(())
    }

    fn poll(&self) -> Result<(), SyncError> {
        let rooms = lock_registry(&self.registry)?.rooms();
        for room_code in rooms {
            if self.refresh_room(&room_code, false)? {
                log::debug!("Room {} changed remotely", room_code);
            }
        }
        Ok(())
    }
}

fn fingerprint(conn: &Connection, room_code: &str) -> rusqlite::Result<RoomFingerprint> {
    conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(revision), 0), COALESCE(MAX(revision), 0)
         FROM availability WHERE room_code = ?1",
        [room_code],
        |row| {
            Ok(RoomFingerprint {
                rows: row.get(0)?,
                revision_sum: row.get(1)?,
                latest_revision: row.get(2)?,
            })
        },
    )
}

fn load_snapshot(conn: &Connection, room_code: &str) -> rusqlite::Result<Vec<MemberSelection>> {
    let mut stmt = conn.prepare(
        "SELECT member_id, slots, revision, updated_at
         FROM availability
         WHERE room_code = ?1
         ORDER BY member_id",
    )?;

    let rows = stmt.query_map([room_code], |row| {
        let slots: String = row.get(1)?;
        Ok(MemberSelection {
            member_id: row.get(0)?,
            slots: SelectionSet::from_wire_json(&slots),
            revision: row.get(2)?,
            updated_at: row.get(3)?,
        })
    })?;

    rows.collect()
}

fn map_sqlite_error(err: rusqlite::Error) -> SyncError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            SyncError::Unavailable(err.to_string())
        }
        _ => SyncError::Storage(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slot::SlotKey;
    use std::sync::mpsc;

    fn keys(raw: &[&str]) -> SelectionSet {
        raw.iter().map(|k| k.parse::<SlotKey>().unwrap()).collect()
    }

    fn create_room(conn: &Connection, code: &str) {
        conn.execute(
            "INSERT INTO rooms (code, title) VALUES (?1, ?2)",
            params![code, "Test room"],
        )
        .unwrap();
    }

    fn setup_store() -> SqliteRoomSync {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        create_room(db.connection(), "ROOM01");
        SqliteRoomSync::from_database(db)
    }

    fn channel_callback() -> (SelectionCallback, mpsc::Receiver<Vec<MemberSelection>>) {
        let (tx, rx) = mpsc::channel();
        let callback: SelectionCallback = Box::new(move |snapshot: &[MemberSelection]| {
            let _ = tx.send(snapshot.to_vec());
        });
        (callback, rx)
    }

    #[test]
    fn test_save_and_snapshot() {
        let store = setup_store();
        store
            .save_selection("ROOM01", "alice", &keys(&["0-0", "0-1"]), 5)
            .unwrap();

        let snapshot = store.snapshot("ROOM01").unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].member_id, "alice");
        assert_eq!(snapshot[0].slots, keys(&["0-0", "0-1"]));
        assert_eq!(snapshot[0].revision, 5);
    }

    #[test]
    fn test_selection_stored_as_string_array() {
        let store = setup_store();
        store
            .save_selection("ROOM01", "alice", &keys(&["0-1", "0-0"]), 1)
            .unwrap();

        let db = store.lock_db().unwrap();
        let raw: String = db
            .connection()
            .query_row(
                "SELECT slots FROM availability WHERE member_id = 'alice'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(raw, r#"["0-0","0-1"]"#);
    }

    #[test]
    fn test_stale_revision_is_ignored() {
        let store = setup_store();
        store
            .save_selection("ROOM01", "alice", &keys(&["2-2"]), 20)
            .unwrap();
        store
            .save_selection("ROOM01", "alice", &keys(&["1-1"]), 10)
            .unwrap();

        let snapshot = store.snapshot("ROOM01").unwrap();
        assert_eq!(snapshot[0].slots, keys(&["2-2"]));
    }

    #[test]
    fn test_unknown_room_is_reported() {
        let store = setup_store();
        let err = store
            .save_selection("NOROOM", "alice", &keys(&["0-0"]), 1)
            .unwrap_err();
        assert_eq!(err, SyncError::UnknownRoom("NOROOM".to_string()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_malformed_stored_selection_reads_as_empty() {
        let store = setup_store();
        {
            let db = store.lock_db().unwrap();
            db.connection()
                .execute(
                    "INSERT INTO availability (room_code, member_id, slots, revision)
                     VALUES ('ROOM01', 'legacy', '{\"0-0\": true}', 1)",
                    [],
                )
                .unwrap();
        }

        let snapshot = store.snapshot("ROOM01").unwrap();
        assert_eq!(snapshot[0].member_id, "legacy");
        assert!(snapshot[0].slots.is_empty());
    }

    #[test]
    fn test_subscribe_then_save_notifies() {
        let store = setup_store();
        let (callback, rx) = channel_callback();
        let _sub = store.subscribe_all_selections("ROOM01", callback).unwrap();
        assert!(rx.try_recv().unwrap().is_empty());

        store
            .save_selection("ROOM01", "bob", &keys(&["3-3"]), 1)
            .unwrap();
        assert_eq!(rx.try_recv().unwrap()[0].member_id, "bob");
    }

    #[test]
    fn test_poll_detects_writes_from_other_connections() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("shared.db");
        let path = path.to_str().unwrap();

        let mine = SqliteRoomSync::open(path).unwrap();
        let theirs = SqliteRoomSync::open(path).unwrap();
        {
            let db = mine.lock_db().unwrap();
            create_room(db.connection(), "ROOM01");
        }

        let (callback, rx) = channel_callback();
        let _sub = mine.subscribe_all_selections("ROOM01", callback).unwrap();
        rx.try_recv().unwrap();

        mine.poll().unwrap();
        assert!(rx.try_recv().is_err(), "nothing changed yet");

        theirs
            .save_selection("ROOM01", "remote", &keys(&["5-5"]), 1)
            .unwrap();
        mine.poll().unwrap();

        let update = rx.try_recv().unwrap();
        assert_eq!(update[0].member_id, "remote");

        mine.poll().unwrap();
        assert!(rx.try_recv().is_err(), "unchanged room is not re-sent");
    }
}
