// Room model
// A scheduling room and the members who joined it

use serde::{Deserialize, Serialize};

pub const ROOM_CODE_LEN: usize = 6;
pub const MAX_TITLE_LEN: usize = 80;
pub const MAX_NICKNAME_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Short uppercase code members type to join.
    pub code: String,
    pub title: String,
    /// SHA-256 hex of the room password, `None` for open rooms.
    pub password_hash: Option<String>,
    pub created_at: Option<String>,
}

impl Room {
    pub fn validate(&self) -> Result<(), String> {
        if !Self::is_valid_code(&self.code) {
            return Err(format!(
                "Room code must be {} uppercase letters or digits",
                ROOM_CODE_LEN
            ));
        }

        let title = self.title.trim();
        if title.is_empty() {
            return Err("Room title cannot be empty".to_string());
        }

        if title.chars().count() > MAX_TITLE_LEN {
            return Err(format!(
                "Room title cannot be longer than {} characters",
                MAX_TITLE_LEN
            ));
        }

        Ok(())
    }

    pub fn is_valid_code(code: &str) -> bool {
        code.len() == ROOM_CODE_LEN
            && code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    }

    /// Room codes are case-insensitive on input.
    pub fn normalize_code(input: &str) -> String {
        input.trim().to_ascii_uppercase()
    }

    pub fn requires_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub room_code: String,
    pub nickname: String,
    pub joined_at: Option<String>,
}

impl Member {
    pub fn validate(&self) -> Result<(), String> {
        validate_nickname(&self.nickname)
    }
}

pub fn validate_nickname(nickname: &str) -> Result<(), String> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err("Nickname cannot be empty".to_string());
    }

    if nickname.chars().count() > MAX_NICKNAME_LEN {
        return Err(format!(
            "Nickname cannot be longer than {} characters",
            MAX_NICKNAME_LEN
        ));
    }

    Ok(())
}
