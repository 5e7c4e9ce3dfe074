use crate::services::aggregate::intensity;
use crate::ui_egui::theme::MoimTheme;
use egui::Color32;

fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |c1: u8, c2: u8| -> u8 { ((c1 as f32 * (1.0 - t)) + (c2 as f32 * t)).round() as u8 };
    Color32::from_rgb(lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b()))
}

#[derive(Clone, Copy, Debug)]
pub struct HeatPalette {
    pub empty: Color32,
    pub hot: Color32,
    pub mine: Color32,
    pub mine_outline: Color32,
    pub hour_line: Color32,
    pub slot_line: Color32,
    pub hover_overlay: Color32,
    pub header_text: Color32,
    pub label_text: Color32,
}

impl HeatPalette {
    pub fn from_theme(theme: &MoimTheme) -> Self {
        Self {
            empty: theme.cell_empty,
            hot: theme.cell_hot,
            mine: theme.primary,
            mine_outline: theme.primary_outline,
            hour_line: theme.grid_line,
            slot_line: with_alpha(theme.grid_line, 120),
            hover_overlay: with_alpha(theme.primary_outline, if theme.is_dark { 70 } else { 40 }),
            header_text: theme.text_primary,
            label_text: theme.text_secondary,
        }
    }

    /// Linear blend from the empty colour to the hot colour, saturating
    /// at `cap` members.
    pub fn heat_color(&self, count: usize, cap: usize) -> Color32 {
        blend(self.empty, self.hot, intensity(count, cap))
    }

    /// Cells in the local selection use the primary colour, darkened a
    /// little by heat so busy slots still stand out.
    pub fn cell_fill(&self, count: usize, cap: usize, mine: bool) -> Color32 {
        if mine {
            blend(self.mine, self.hot, intensity(count, cap) * 0.35)
        } else {
            self.heat_color(count, cap)
        }
    }

    /// Readable count text on top of `fill`.
    pub fn count_text(&self, fill: Color32) -> Color32 {
        let luma = 0.299 * fill.r() as f32 + 0.587 * fill.g() as f32 + 0.114 * fill.b() as f32;
        if luma > 150.0 {
            Color32::from_gray(40)
        } else {
            Color32::from_gray(240)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: Color32, b: Color32) -> i32 {
        (a.r() as i32 - b.r() as i32).abs()
            + (a.g() as i32 - b.g() as i32).abs()
            + (a.b() as i32 - b.b() as i32).abs()
    }

    #[test]
    fn test_heat_color_endpoints() {
        let palette = HeatPalette::from_theme(&MoimTheme::light());
        assert_eq!(palette.heat_color(0, 5), palette.empty);
        assert_eq!(palette.heat_color(5, 5), palette.hot);
        assert_eq!(palette.heat_color(12, 5), palette.hot);
    }

    #[test]
    fn test_heat_color_is_monotonic() {
        let palette = HeatPalette::from_theme(&MoimTheme::dark());
        let mut previous = distance(palette.heat_color(0, 5), palette.empty);
        for count in 1..=7 {
            let current = distance(palette.heat_color(count, 5), palette.empty);
            assert!(current >= previous, "count {} went backwards", count);
            previous = current;
        }
    }

    #[test]
    fn test_own_cells_differ_from_heat() {
        let palette = HeatPalette::from_theme(&MoimTheme::light());
        assert_eq!(palette.cell_fill(0, 5, true), palette.mine);
        assert_ne!(palette.cell_fill(1, 5, true), palette.cell_fill(1, 5, false));
    }

    #[test]
    fn test_count_text_contrasts_with_fill() {
        let palette = HeatPalette::from_theme(&MoimTheme::light());
        assert_eq!(palette.count_text(Color32::WHITE), Color32::from_gray(40));
        assert_eq!(palette.count_text(Color32::BLACK), Color32::from_gray(240));
    }
}
