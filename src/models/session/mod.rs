// Session model
// Who the local user is and which room they are in

use serde::{Deserialize, Serialize};

/// Identity of the local user inside one room.
///
/// Passed explicitly to the room screen; nothing in the core reads it
/// from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub room_code: String,
    pub member_id: String,
    pub nickname: String,
}

impl Session {
    pub fn new(
        room_code: impl Into<String>,
        member_id: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            room_code: room_code.into(),
            member_id: member_id.into(),
            nickname: nickname.into(),
        }
    }
}
