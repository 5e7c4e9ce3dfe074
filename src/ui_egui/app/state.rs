use super::room::RoomScreen;
use crate::models::room::{validate_nickname, Room};
use crate::models::session::Session;

pub enum Screen {
    Home(HomeState),
    Room(Box<RoomScreen>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeTab {
    #[default]
    Create,
    Join,
}

#[derive(Debug, Clone, Default)]
pub struct CreateForm {
    pub title: String,
    pub nickname: String,
    pub password: String,
}

impl CreateForm {
    pub fn can_submit(&self) -> bool {
        !self.title.trim().is_empty() && validate_nickname(&self.nickname).is_ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct JoinForm {
    pub code: String,
    pub nickname: String,
    pub password: String,
}

impl JoinForm {
    pub fn can_submit(&self) -> bool {
        Room::is_valid_code(&Room::normalize_code(&self.code))
            && validate_nickname(&self.nickname).is_ok()
    }
}

/// Home screen: create a room, join one by code, or continue the last one.
#[derive(Debug, Clone, Default)]
pub struct HomeState {
    pub tab: HomeTab,
    pub create: CreateForm,
    pub join: JoinForm,
    pub last_session: Option<Session>,
    pub error: Option<String>,
}

impl HomeState {
    pub fn new(last_session: Option<Session>) -> Self {
        let mut state = Self {
            last_session,
            ..Self::default()
        };
        // Prefill the nickname used last time.
        if let Some(session) = &state.last_session {
            state.create.nickname = session.nickname.clone();
            state.join.nickname = session.nickname.clone();
        }
        state
    }
}
