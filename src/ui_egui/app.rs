mod context;
mod home;
mod lifecycle;
mod room;
mod sidebar;
mod state;
mod toast;

use self::context::AppContext;
use self::state::Screen;
use self::toast::ToastManager;
use crate::ui_egui::theme::MoimTheme;
use crate::ui_egui::views::HeatPalette;

pub struct MoimApp {
    /// Shared access to the leaked database, room store and configuration
    context: AppContext,
    /// Which screen is showing, with its state
    screen: Screen,
    /// Currently applied theme colors
    active_theme: MoimTheme,
    palette: HeatPalette,
    toast_manager: ToastManager,
}

impl eframe::App for MoimApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.handle_update(ctx, frame);
    }

    fn on_exit(&mut self, gl: Option<&eframe::glow::Context>) {
        self.handle_exit(gl);
    }
}
