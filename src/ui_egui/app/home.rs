//! Home screen: create a room, join one by code, or continue the last room.

use super::context::AppContext;
use super::state::{HomeState, HomeTab};
use super::toast::ToastManager;
use crate::models::session::Session;
use crate::services::room::RoomAccessError;
use egui::RichText;

const FORM_WIDTH: f32 = 320.0;

fn describe_error(err: &RoomAccessError) -> String {
    match err {
        RoomAccessError::NotFound(code) => format!("{} 방을 찾을 수 없습니다", code),
        RoomAccessError::WrongPassword(_) => "비밀번호가 올바르지 않습니다".to_string(),
        RoomAccessError::Invalid(message) => message.clone(),
        RoomAccessError::Storage(e) => format!("저장소 오류: {}", e),
    }
}

/// Renders the home screen. Returns the session to enter when the user
/// created, joined or continued a room this frame.
pub(super) fn render_home(
    ctx: &egui::Context,
    app: &AppContext,
    state: &mut HomeState,
    toasts: &mut ToastManager,
) -> Option<Session> {
    let mut entered = None;

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(RichText::new("모임").size(32.0));
            ui.label(RichText::new("다 같이 되는 시간을 찾아보세요").weak());
            ui.add_space(24.0);

            ui.allocate_ui(egui::vec2(FORM_WIDTH, ui.available_height()), |ui| {
                if let Some(session) = render_continue(ui, state) {
                    entered = Some(session);
                }

                ui.horizontal(|ui| {
                    ui.selectable_value(&mut state.tab, HomeTab::Create, "방 만들기");
                    ui.selectable_value(&mut state.tab, HomeTab::Join, "방 참여하기");
                });
                ui.separator();

                let submitted = match state.tab {
                    HomeTab::Create => render_create_form(ui, app, state),
                    HomeTab::Join => render_join_form(ui, app, state),
                };

                match submitted {
                    Some(Ok(session)) => {
                        state.error = None;
                        toasts.success(format!("{} 방에 들어왔습니다", session.room_code));
                        entered = Some(session);
                    }
                    Some(Err(err)) => {
                        log::warn!("Room access failed: {}", err);
                        state.error = Some(describe_error(&err));
                    }
                    None => {}
                }

                if let Some(error) = &state.error {
                    ui.add_space(8.0);
                    ui.colored_label(ui.visuals().error_fg_color, error.as_str());
                }
            });
        });
    });

    entered
}

fn render_continue(ui: &mut egui::Ui, state: &HomeState) -> Option<Session> {
    let session = state.last_session.as_ref()?;

    let mut chosen = None;
    ui.group(|ui| {
        ui.set_min_width(FORM_WIDTH);
        ui.label(RichText::new("최근 방").small().weak());
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("{} · {}", session.room_code, session.nickname)).strong(),
            );
            if ui.button("계속하기").clicked() {
                chosen = Some(session.clone());
            }
        });
    });
    ui.add_space(12.0);
    chosen
}

fn labelled_field(ui: &mut egui::Ui, label: &str, value: &mut String, password: bool) {
    ui.label(label);
    ui.add(
        egui::TextEdit::singleline(value)
            .password(password)
            .desired_width(FORM_WIDTH),
    );
    ui.add_space(4.0);
}

fn render_create_form(
    ui: &mut egui::Ui,
    app: &AppContext,
    state: &mut HomeState,
) -> Option<Result<Session, RoomAccessError>> {
    let form = &mut state.create;
    labelled_field(ui, "방 이름", &mut form.title, false);
    labelled_field(ui, "닉네임", &mut form.nickname, false);
    labelled_field(ui, "비밀번호 (선택)", &mut form.password, true);

    let clicked = ui
        .add_enabled(form.can_submit(), egui::Button::new("만들기"))
        .clicked();
    if !clicked {
        return None;
    }

    Some(
        app.room_service()
            .create_room(&form.title, &form.nickname, &form.password),
    )
}

fn render_join_form(
    ui: &mut egui::Ui,
    app: &AppContext,
    state: &mut HomeState,
) -> Option<Result<Session, RoomAccessError>> {
    let form = &mut state.join;
    labelled_field(ui, "방 코드", &mut form.code, false);
    labelled_field(ui, "닉네임", &mut form.nickname, false);
    labelled_field(ui, "비밀번호", &mut form.password, true);

    let clicked = ui
        .add_enabled(form.can_submit(), egui::Button::new("참여하기"))
        .clicked();
    if !clicked {
        return None;
    }

    Some(
        app.room_service()
            .join_room(&form.code, &form.nickname, &form.password),
    )
}
