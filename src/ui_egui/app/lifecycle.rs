use super::context::AppContext;
use super::home::render_home;
use super::room::{RoomAction, RoomScreen};
use super::state::{HomeState, Screen};
use super::toast::ToastManager;
use super::MoimApp;
use crate::models::session::Session;
use crate::services::config::AppConfig;
use crate::services::database::Database;
use crate::services::room_sync::SqliteRoomSync;
use crate::services::session::SessionStore;
use crate::ui_egui::theme::MoimTheme;
use crate::ui_egui::views::HeatPalette;
use anyhow::{Context as _, Result};
use std::path::Path;

const FONT_NAME: &str = "moim-hangul";

impl MoimApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self> {
        let config = AppConfig::load();
        install_fonts(&cc.egui_ctx, config.font_path.as_deref());

        let db_path = config.resolve_database_path();
        // Leaked for the 'static lifetime the UI services borrow from
        let database = initialize_database(&db_path)?;
        let room_sync = SqliteRoomSync::open(&db_path.to_string_lossy())
            .context("Failed to open the room store")?;

        let session_store = SessionStore::in_data_dir();
        let last_session = load_last_session(&session_store);

        let active_theme = MoimTheme::for_dark_mode(cc.egui_ctx.style().visuals.dark_mode);
        active_theme.apply_to_context(&cc.egui_ctx);

        let context = AppContext::new(database, room_sync, config, session_store);
        log::info!("Using database {}", db_path.display());

        Ok(Self {
            context,
            screen: Screen::Home(HomeState::new(last_session)),
            palette: HeatPalette::from_theme(&active_theme),
            active_theme,
            toast_manager: ToastManager::new(),
        })
    }

    pub(super) fn handle_update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let next = match &mut self.screen {
            Screen::Home(state) => {
                render_home(ctx, &self.context, state, &mut self.toast_manager).map(Next::Enter)
            }
            Screen::Room(room) => {
                match room.show(ctx, &self.context, &self.palette, &mut self.toast_manager) {
                    RoomAction::Stay => None,
                    RoomAction::Leave => Some(Next::Leave),
                }
            }
        };

        match next {
            Some(Next::Enter(session)) => self.enter_room(ctx, session),
            Some(Next::Leave) => self.leave_room(),
            None => {}
        }

        // Render toast notifications (last, so they appear on top)
        self.toast_manager.render(ctx, self.active_theme.is_dark);
    }

    fn enter_room(&mut self, ctx: &egui::Context, session: Session) {
        match RoomScreen::open(ctx, &self.context, session.clone()) {
            Ok(room) => {
                if let Err(e) = self.context.session_store().save(&session) {
                    log::warn!("Failed to remember session: {:#}", e);
                }
                self.screen = Screen::Room(Box::new(room));
            }
            Err(e) => {
                log::error!("Failed to open room {}: {:#}", session.room_code, e);
                self.toast_manager.error(format!("방을 열 수 없습니다: {}", e));
                if let Screen::Home(state) = &mut self.screen {
                    if state.last_session.as_ref() == Some(&session) {
                        state.last_session = None;
                        if let Err(e) = self.context.session_store().clear() {
                            log::warn!("Failed to clear stale session: {:#}", e);
                        }
                    }
                }
            }
        }
    }

    fn leave_room(&mut self) {
        if let Screen::Room(room) = &mut self.screen {
            room.flush(self.context.room_sync());
            log::info!("Left room {}", room.session.room_code);
            self.toast_manager
                .info(format!("{} 방에서 나왔습니다", room.session.room_code));
        }

        if let Err(e) = self.context.session_store().clear() {
            log::warn!("Failed to clear session: {:#}", e);
        }
        self.screen = Screen::Home(HomeState::new(None));
    }

    pub(super) fn handle_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Screen::Room(room) = &mut self.screen {
            room.flush(self.context.room_sync());
        }
    }
}

enum Next {
    Enter(Session),
    Leave,
}

fn initialize_database(path: &Path) -> Result<&'static Database> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let db = Database::new(&path.to_string_lossy()).context("Failed to create database connection")?;
    db.initialize_schema()
        .context("Failed to initialize database schema")?;

    Ok(Box::leak(Box::new(db)))
}

fn load_last_session(store: &SessionStore) -> Option<Session> {
    match store.load() {
        Ok(session) => session,
        Err(e) => {
            log::warn!("Failed to load last session: {:#}, starting fresh", e);
            None
        }
    }
}

/// Adds the configured font as a fallback for every family so Hangul day
/// labels render.
fn install_fonts(ctx: &egui::Context, font_path: Option<&Path>) {
    let Some(path) = font_path else {
        return;
    };

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to read font {}: {}", path.display(), e);
            return;
        }
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert(FONT_NAME.to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(FONT_NAME.to_owned());
    }
    ctx.set_fonts(fonts);
    log::info!("Installed font {}", path.display());
}
