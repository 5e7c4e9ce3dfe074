//! Availability grid widget.
//!
//! Paints day columns × slot rows, tints each cell by how many members
//! picked it, and feeds raw pointer input (mouse or touch) through
//! [`PointerTracker`] into the [`SlotGrid`] gesture state machine.

use egui::{Align2, CursorIcon, FontId, Pos2, Rect, Sense, Stroke, Vec2};

use super::palette::HeatPalette;
use crate::models::selection::SelectionSet;
use crate::models::slot::{GridConfig, SlotKey};
use crate::services::aggregate::Heatmap;
use crate::services::gesture::{GestureCommand, SlotGrid};
use crate::utils::slot_time::SlotTimeCodec;

pub const TIME_LABEL_WIDTH: f32 = 50.0;
pub const HEADER_HEIGHT: f32 = 26.0;
pub const SLOT_HEIGHT: f32 = 22.0;
pub const MIN_COLUMN_WIDTH: f32 = 44.0;

/// Cell geometry for one frame: maps screen positions to slot keys.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    cells: Rect,
    days: u8,
    slots: u16,
}

impl GridLayout {
    pub fn new(cells: Rect, days: u8, slots: u16) -> Self {
        Self { cells, days, slots }
    }

    pub fn cells_rect(&self) -> Rect {
        self.cells
    }

    pub fn column_width(&self) -> f32 {
        self.cells.width() / f32::from(self.days.max(1))
    }

    pub fn row_height(&self) -> f32 {
        self.cells.height() / f32::from(self.slots.max(1))
    }

    /// Cell under `pos`, or `None` for positions outside the cell area
    /// (headers, time labels, beyond the grid).
    pub fn cell_at(&self, pos: Pos2) -> Option<SlotKey> {
        if self.days == 0 || self.slots == 0 || !self.cells.contains(pos) {
            return None;
        }

        let col = ((pos.x - self.cells.left()) / self.column_width()).floor() as i64;
        let row = ((pos.y - self.cells.top()) / self.row_height()).floor() as i64;
        let day = u8::try_from(col).ok().filter(|d| *d < self.days)?;
        let slot = u16::try_from(row).ok().filter(|s| *s < self.slots)?;
        Some(SlotKey::new(day, slot))
    }

    pub fn cell_rect(&self, key: SlotKey) -> Rect {
        let min = Pos2::new(
            self.cells.left() + f32::from(key.day) * self.column_width(),
            self.cells.top() + f32::from(key.slot) * self.row_height(),
        );
        Rect::from_min_size(min, Vec2::new(self.column_width(), self.row_height()))
    }
}

/// Pointer state read from egui for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub pressed: bool,
    pub down: bool,
    pub released: bool,
    /// Latest pointer position, `None` once the pointer left the window.
    pub pos: Option<Pos2>,
    /// Whether the press landed on the grid rather than a layer above it.
    pub over_grid: bool,
}

impl PointerSample {
    pub fn read(ui: &egui::Ui, response: &egui::Response) -> Self {
        let over_grid = response.contains_pointer();
        ui.input(|i| Self {
            pressed: i.pointer.primary_pressed(),
            down: i.pointer.primary_down(),
            released: i.pointer.primary_released(),
            pos: i.pointer.latest_pos(),
            over_grid,
        })
    }
}

/// Translates per-frame pointer samples into begin/move/end commands.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    active: bool,
    last_cell: Option<SlotKey>,
}

impl PointerTracker {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn commands(&mut self, sample: PointerSample, layout: &GridLayout) -> Vec<GestureCommand> {
        let mut commands = Vec::new();
        let cell = sample.pos.and_then(|pos| layout.cell_at(pos));

        if sample.pressed && sample.over_grid {
            if let Some(cell) = cell {
                self.active = true;
                self.last_cell = Some(cell);
                commands.push(GestureCommand::Begin(cell));
                if !sample.released {
                    return commands;
                }
            }
        }

        if !self.active {
            return commands;
        }

        // Release, a lost release, or the pointer leaving the window all end the gesture.
        if sample.released || !sample.down || sample.pos.is_none() {
            self.active = false;
            self.last_cell = None;
            commands.push(GestureCommand::End);
            return commands;
        }

        // Positions over chrome or outside the cells are ignored.
        if let Some(cell) = cell {
            if self.last_cell != Some(cell) {
                self.last_cell = Some(cell);
                commands.push(GestureCommand::Move(cell));
            }
        }

        commands
    }
}

#[derive(Debug, Default)]
pub struct SlotGridOutput {
    /// Full selection committed by a finished gesture this frame.
    pub commits: Vec<SelectionSet>,
    pub hovered: Option<SlotKey>,
}

pub struct SlotGridView<'a> {
    pub config: &'a GridConfig,
    pub heatmap: &'a Heatmap,
    pub palette: &'a HeatPalette,
    pub heat_cap: usize,
}

impl<'a> SlotGridView<'a> {
    pub fn show(
        &self,
        ui: &mut egui::Ui,
        grid: &mut SlotGrid,
        tracker: &mut PointerTracker,
    ) -> SlotGridOutput {
        let days = u8::try_from(self.config.days()).unwrap_or(u8::MAX);
        let slots = self.config.slots_per_day();

        let width = ui
            .available_width()
            .max(TIME_LABEL_WIDTH + f32::from(days) * MIN_COLUMN_WIDTH);
        let height = HEADER_HEIGHT + f32::from(slots) * SLOT_HEIGHT;
        let (rect, response) =
            ui.allocate_exact_size(Vec2::new(width, height), Sense::click_and_drag());

        let cells = Rect::from_min_max(
            Pos2::new(rect.left() + TIME_LABEL_WIDTH, rect.top() + HEADER_HEIGHT),
            rect.max,
        );
        let layout = GridLayout::new(cells, days, slots);

        let mut output = SlotGridOutput::default();
        for command in tracker.commands(PointerSample::read(ui, &response), &layout) {
            if let Some(committed) = grid.apply(command) {
                output.commits.push(committed);
            }
        }
        if grid.is_dragging() {
            ui.ctx().request_repaint();
        }

        output.hovered = response
            .hover_pos()
            .and_then(|pos| layout.cell_at(pos));

        if ui.is_rect_visible(rect) {
            self.paint(ui, rect, &layout, grid.selection(), output.hovered);
        }

        if let Some(key) = output.hovered {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
            if !grid.is_dragging() {
                let codec = SlotTimeCodec::new(self.config);
                let text = codec.format_key(key, self.heatmap.count(key));
                response.on_hover_text_at_pointer(text);
            }
        }

        output
    }

    fn paint(
        &self,
        ui: &egui::Ui,
        rect: Rect,
        layout: &GridLayout,
        selection: &SelectionSet,
        hovered: Option<SlotKey>,
    ) {
        let painter = ui.painter_at(rect);
        let codec = SlotTimeCodec::new(self.config);
        let palette = self.palette;
        let col_width = layout.column_width();

        for day in 0..layout.days {
            let x = layout.cells_rect().left() + f32::from(day) * col_width + col_width / 2.0;
            let label = self
                .config
                .day_label(day)
                .map(str::to_string)
                .unwrap_or_else(|| day.to_string());
            painter.text(
                Pos2::new(x, rect.top() + HEADER_HEIGHT / 2.0),
                Align2::CENTER_CENTER,
                label,
                FontId::proportional(14.0),
                palette.header_text,
            );
        }

        let per_hour = self.config.slots_per_hour as u16;
        for slot in 0..layout.slots {
            let row = layout.cell_rect(SlotKey::new(0, slot));
            let is_hour_start = slot % per_hour == 0;

            if is_hour_start {
                painter.text(
                    Pos2::new(rect.left() + TIME_LABEL_WIDTH - 6.0, row.top()),
                    Align2::RIGHT_TOP,
                    codec.row_label(slot),
                    FontId::proportional(11.0),
                    palette.label_text,
                );
            }

            for day in 0..layout.days {
                let key = SlotKey::new(day, slot);
                let cell = layout.cell_rect(key);
                let count = self.heatmap.count(key);
                let mine = selection.contains(key);
                let fill = palette.cell_fill(count, self.heat_cap, mine);

                painter.rect_filled(cell, 0.0, fill);
                if mine {
                    painter.rect_stroke(cell.shrink(1.0), 2.0, Stroke::new(2.0, palette.mine_outline));
                }
                if count > 0 {
                    painter.text(
                        cell.center(),
                        Align2::CENTER_CENTER,
                        count.to_string(),
                        FontId::proportional(10.0),
                        palette.count_text(fill),
                    );
                }
                if hovered == Some(key) {
                    painter.rect_filled(cell, 0.0, palette.hover_overlay);
                }
            }

            let line = if is_hour_start {
                palette.hour_line
            } else {
                palette.slot_line
            };
            painter.line_segment(
                [
                    Pos2::new(layout.cells_rect().left(), row.top()),
                    Pos2::new(layout.cells_rect().right(), row.top()),
                ],
                Stroke::new(1.0, line),
            );
        }

        for day in 0..=layout.days {
            let x = layout.cells_rect().left() + f32::from(day) * col_width;
            painter.line_segment(
                [
                    Pos2::new(x, layout.cells_rect().top()),
                    Pos2::new(x, layout.cells_rect().bottom()),
                ],
                Stroke::new(1.0, palette.hour_line),
            );
        }
    }
}
