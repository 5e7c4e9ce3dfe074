//! Room service: creating and joining rooms, and the member roster.

use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::models::room::{validate_nickname, Member, Room, ROOM_CODE_LEN};
use crate::models::session::Session;
use crate::utils::hash::hash_password;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const MAX_CODE_ATTEMPTS: usize = 16;

#[derive(Debug, Error)]
pub enum RoomAccessError {
    #[error("room '{0}' was not found")]
    NotFound(String),
    #[error("wrong password for room '{0}'")]
    WrongPassword(String),
    #[error("{0}")]
    Invalid(String),
    #[error("room storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type RoomResult<T> = std::result::Result<T, RoomAccessError>;

pub struct RoomService<'a> {
    conn: &'a Connection,
}

impl<'a> RoomService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Creates a room and registers its creator as the first member.
    ///
    /// An empty `password` creates an open room.
    pub fn create_room(&self, title: &str, nickname: &str, password: &str) -> RoomResult<Session> {
        let title = title.trim();
        let nickname = nickname.trim();
        validate_nickname(nickname).map_err(RoomAccessError::Invalid)?;

        let mut room = Room {
            code: String::new(),
            title: title.to_string(),
            password_hash: hash_password(password),
            created_at: None,
        };

        // The room and its creator are stored together or not at all.
        let tx = self.conn.unchecked_transaction()?;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            room.code = generate_room_code();
            room.validate().map_err(RoomAccessError::Invalid)?;

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO rooms (code, title, password_hash) VALUES (?1, ?2, ?3)",
                params![room.code, room.title, room.password_hash],
            )?;

            if inserted == 1 {
                let member = self.add_member(&room.code, nickname)?;
                tx.commit()?;
                log::info!("Created room {} ('{}')", room.code, room.title);
                return Ok(Session::new(room.code, member.id, member.nickname));
            }

            log::debug!("Room code {} already taken (attempt {})", room.code, attempt);
        }

        Err(RoomAccessError::Invalid(
            "Could not allocate a free room code".to_string(),
        ))
    }

    /// Joins an existing room as a new member.
    pub fn join_room(&self, code: &str, nickname: &str, password: &str) -> RoomResult<Session> {
        let code = Room::normalize_code(code);
        let nickname = nickname.trim();
        validate_nickname(nickname).map_err(RoomAccessError::Invalid)?;

        let room = self
            .get_room(&code)?
            .ok_or_else(|| RoomAccessError::NotFound(code.clone()))?;

        if let Some(expected) = room.password_hash.as_deref() {
            if hash_password(password).as_deref() != Some(expected) {
                log::warn!("Rejected join to room {}: wrong password", room.code);
                return Err(RoomAccessError::WrongPassword(room.code));
            }
        }

        let member = self.add_member(&room.code, nickname)?;
        log::info!("{} joined room {}", member.nickname, room.code);
        Ok(Session::new(room.code, member.id, member.nickname))
    }

    pub fn get_room(&self, code: &str) -> RoomResult<Option<Room>> {
        let room = self
            .conn
            .query_row(
                "SELECT code, title, password_hash, created_at FROM rooms WHERE code = ?1",
                params![code],
                |row| {
                    Ok(Room {
                        code: row.get(0)?,
                        title: row.get(1)?,
                        password_hash: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(room)
    }

    /// Members of `code` in the order they joined.
    pub fn list_members(&self, code: &str) -> RoomResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, room_code, nickname, joined_at
             FROM members
             WHERE room_code = ?1
             ORDER BY joined_at ASC, rowid ASC",
        )?;

        let members = stmt.query_map(params![code], |row| {
            Ok(Member {
                id: row.get(0)?,
                room_code: row.get(1)?,
                nickname: row.get(2)?,
                joined_at: row.get(3)?,
            })
        })?;

        members
            .collect::<Result<Vec<_>, _>>()
            .map_err(RoomAccessError::from)
    }

    /// Whether `member_id` is still registered in `code`.
    pub fn is_member(&self, code: &str, member_id: &str) -> RoomResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM members WHERE room_code = ?1 AND id = ?2",
            params![code, member_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn add_member(&self, code: &str, nickname: &str) -> RoomResult<Member> {
        let member = Member {
            id: uuid::Uuid::new_v4().to_string(),
            room_code: code.to_string(),
            nickname: nickname.to_string(),
            joined_at: None,
        };
        member.validate().map_err(RoomAccessError::Invalid)?;

        self.conn.execute(
            "INSERT INTO members (id, room_code, nickname) VALUES (?1, ?2, ?3)",
            params![member.id, member.room_code, member.nickname],
        )?;

        Ok(member)
    }
}

fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
