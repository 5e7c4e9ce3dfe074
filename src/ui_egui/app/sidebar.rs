//! Room side panel: room code, member roster, best slots and save status.

use super::context::AppContext;
use super::room::{RoomAction, RoomScreen};
use crate::services::save_queue::SaveStatus;
use crate::utils::slot_time::SlotTimeCodec;
use egui::{Color32, RichText};

const SIDEBAR_MIN_WIDTH: f32 = 180.0;
const SIDEBAR_DEFAULT_WIDTH: f32 = 220.0;
const SIDEBAR_MAX_WIDTH: f32 = 320.0;

fn status_color(status: &SaveStatus) -> Color32 {
    match status {
        SaveStatus::Saved => Color32::from_rgb(60, 160, 90),
        SaveStatus::Pending => Color32::from_rgb(200, 150, 40),
        SaveStatus::Failed { .. } => Color32::from_rgb(200, 60, 60),
    }
}

impl RoomScreen {
    pub(super) fn render_sidebar(
        &self,
        ctx: &egui::Context,
        app: &AppContext,
        action: &mut RoomAction,
    ) {
        egui::SidePanel::right("room_sidebar")
            .default_width(SIDEBAR_DEFAULT_WIDTH)
            .min_width(SIDEBAR_MIN_WIDTH)
            .max_width(SIDEBAR_MAX_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                ui.vertical(|ui| {
                    self.render_room_info(ui, action);
                    ui.add_space(8.0);
                    ui.separator();
                    ui.add_space(8.0);
                    self.render_best_slots(ui, app);
                    ui.add_space(8.0);
                    ui.separator();
                    ui.add_space(8.0);
                    self.render_members(ui);
                    ui.add_space(8.0);
                    ui.separator();
                    self.render_save_status(ui);
                });
            });
    }

    fn render_room_info(&self, ui: &mut egui::Ui, action: &mut RoomAction) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("방 코드").small().weak());
            if self.room.requires_password() {
                ui.label(RichText::new("🔒").small());
            }
        });
        ui.horizontal(|ui| {
            ui.label(RichText::new(&self.room.code).monospace().size(20.0).strong());
            if ui.small_button("복사").clicked() {
                ui.output_mut(|o| o.copied_text = self.room.code.clone());
            }
        });
        ui.label(RichText::new(format!("{} (으)로 참여 중", self.session.nickname)).small());

        ui.add_space(4.0);
        if ui.button("방 나가기").clicked() {
            *action = RoomAction::Leave;
        }
    }

    fn render_best_slots(&self, ui: &mut egui::Ui, app: &AppContext) {
        ui.label(RichText::new("가장 많이 겹치는 시간").strong());

        let ranked = self.heatmap.top_n(app.config().top_n);
        if ranked.is_empty() {
            ui.label(RichText::new("아직 선택한 사람이 없습니다").small().weak());
            return;
        }

        let codec = SlotTimeCodec::new(&app.config().grid);
        for (rank, entry) in ranked.iter().enumerate() {
            ui.label(format!("{}. {}", rank + 1, codec.format_key(entry.slot, entry.count)));
        }
    }

    fn render_members(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new(format!("참여자 {}명", self.members.len())).strong());

        for member in &self.members {
            let responded = member.id == self.session.member_id
                || self
                    .snapshot
                    .iter()
                    .any(|entry| entry.member_id == member.id && !entry.slots.is_empty());

            ui.horizontal(|ui| {
                let marker = if responded { "●" } else { "○" };
                ui.label(RichText::new(marker).small());
                let mut text = RichText::new(&member.nickname);
                if member.id == self.session.member_id {
                    text = text.strong();
                }
                ui.label(text);
            });
        }
    }

    fn render_save_status(&self, ui: &mut egui::Ui) {
        let status = self.save_queue.status();
        let response = ui.label(
            RichText::new(status.label())
                .small()
                .color(status_color(status)),
        );
        if let SaveStatus::Failed { message, .. } = status {
            response.on_hover_text(message.as_str());
        }
    }
}
