//! Theme module for the egui front-end
//!
//! Defines the MoimTheme structure shared by the grid palette, the side
//! panel and the toasts.

use egui::Color32;

/// Colours used across the application
#[derive(Debug, Clone, PartialEq)]
pub struct MoimTheme {
    /// Whether this is a dark theme (affects base egui::Visuals)
    pub is_dark: bool,

    /// Application background color
    pub app_background: Color32,

    /// Slot cell nobody picked
    pub cell_empty: Color32,

    /// Slot cell everyone (up to the heat cap) picked
    pub cell_hot: Color32,

    /// Fill for cells in the local member's own selection
    pub primary: Color32,

    /// Outline drawn around the local member's cells
    pub primary_outline: Color32,

    /// Grid line color
    pub grid_line: Color32,

    /// Primary text color (headings, labels)
    pub text_primary: Color32,

    /// Secondary text color (time column, hints)
    pub text_secondary: Color32,
}

impl MoimTheme {
    pub fn light() -> Self {
        Self {
            is_dark: false,
            app_background: Color32::from_rgb(250, 248, 244),
            cell_empty: Color32::from_rgb(255, 255, 255),
            cell_hot: Color32::from_rgb(34, 139, 84),
            primary: Color32::from_rgb(92, 140, 240),
            primary_outline: Color32::from_rgb(30, 60, 160),
            grid_line: Color32::from_rgb(226, 222, 214),
            text_primary: Color32::from_rgb(36, 36, 40),
            text_secondary: Color32::from_rgb(110, 108, 104),
        }
    }

    pub fn dark() -> Self {
        Self {
            is_dark: true,
            app_background: Color32::from_rgb(24, 26, 30),
            cell_empty: Color32::from_rgb(38, 41, 46),
            cell_hot: Color32::from_rgb(60, 200, 120),
            primary: Color32::from_rgb(80, 120, 220),
            primary_outline: Color32::from_rgb(180, 205, 255),
            grid_line: Color32::from_rgb(58, 62, 70),
            text_primary: Color32::from_rgb(236, 236, 240),
            text_secondary: Color32::from_rgb(160, 164, 172),
        }
    }

    /// Follows the dark/light preference egui picked up from the platform.
    pub fn for_dark_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Installs the base visuals. The grid paints its own cells from
    /// [`HeatPalette`](crate::ui_egui::views::HeatPalette), so only panels,
    /// text and selection highlights are touched here.
    pub fn apply_to_context(&self, ctx: &egui::Context) {
        let mut visuals = if self.is_dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };

        visuals.panel_fill = self.app_background;
        visuals.window_fill = self.app_background;
        visuals.extreme_bg_color = self.cell_empty;
        visuals.override_text_color = Some(self.text_primary);
        visuals.selection.bg_fill = self.primary;
        visuals.selection.stroke = egui::Stroke::new(1.0, self.primary_outline);
        visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, self.grid_line);

        ctx.set_visuals(visuals);
    }
}
