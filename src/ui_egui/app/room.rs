//! Room screen: the availability grid for one room plus its live heatmap.
//!
//! Remote snapshots arrive through the store subscription on a channel,
//! local commits go through the save queue, and the heatmap is rebuilt
//! from both every frame.

use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};

use super::context::AppContext;
use super::toast::ToastManager;
use crate::models::room::{Member, Room};
use crate::models::selection::MemberSelection;
use crate::models::slot::GridConfig;
use crate::models::session::Session;
use crate::services::aggregate::{room_heatmap, Heatmap};
use crate::services::gesture::SlotGrid;
use crate::services::room_sync::{RoomSync, SelectionCallback, Subscription};
use crate::services::save_queue::{SaveQueue, SaveStatus};
use crate::ui_egui::views::{HeatPalette, PointerTracker, SlotGridView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomAction {
    Stay,
    Leave,
}

pub struct RoomScreen {
    pub(super) session: Session,
    pub(super) room: Room,
    pub(super) members: Vec<Member>,
    pub(super) snapshot: Vec<MemberSelection>,
    pub(super) heatmap: Heatmap,
    pub(super) save_queue: SaveQueue,
    grid: SlotGrid,
    grid_config: GridConfig,
    tracker: PointerTracker,
    updates: Receiver<Vec<MemberSelection>>,
    _subscription: Subscription,
    last_poll: Instant,
    last_reported: Option<SaveStatus>,
}

impl RoomScreen {
    pub fn open(ctx: &egui::Context, app: &AppContext, session: Session) -> Result<Self> {
        let service = app.room_service();
        let room = service
            .get_room(&session.room_code)?
            .with_context(|| format!("Room {} no longer exists", session.room_code))?;
        let members = service.list_members(&room.code)?;

        let (tx, updates) = mpsc::channel();
        let repaint = ctx.clone();
        let callback: SelectionCallback = Box::new(move |snapshot: &[MemberSelection]| {
            let _ = tx.send(snapshot.to_vec());
            repaint.request_repaint();
        });
        let subscription = app
            .room_sync()
            .subscribe_all_selections(&room.code, callback)?;

        let config = app.config();
        let mut screen = Self {
            save_queue: SaveQueue::with_debounce(
                room.code.clone(),
                session.member_id.clone(),
                Duration::from_millis(config.save_debounce_ms),
            ),
            session,
            room,
            members,
            snapshot: Vec::new(),
            heatmap: Heatmap::default(),
            grid: SlotGrid::default(),
            grid_config: config.grid.clone(),
            tracker: PointerTracker::default(),
            updates,
            _subscription: subscription,
            last_poll: Instant::now(),
            last_reported: None,
        };

        // The subscription delivers the current snapshot synchronously.
        screen.drain_updates();
        screen.restore_own_selection();

        log::info!(
            "Entered room {} as {} ({} members)",
            screen.room.code,
            screen.session.nickname,
            screen.members.len()
        );
        Ok(screen)
    }

    /// Seeds the grid with what this member saved in an earlier run.
    fn restore_own_selection(&mut self) {
        let Some(entry) = self
            .snapshot
            .iter()
            .find(|entry| entry.member_id == self.session.member_id)
        else {
            return;
        };

        self.save_queue.resume_after(entry.revision);
        self.grid.set_value(entry.slots.clone());
        self.refresh_heatmap();
    }

    fn drain_updates(&mut self) {
        let mut changed = false;
        while let Ok(mut snapshot) = self.updates.try_recv() {
            // Other clients may run with a larger grid; only our cells count.
            for entry in &mut snapshot {
                let before = entry.slots.len();
                entry.slots.retain_within(&self.grid_config);
                if entry.slots.len() != before {
                    log::warn!(
                        "Dropped {} slots of member {} outside the configured grid",
                        before - entry.slots.len(),
                        entry.member_id
                    );
                }
            }
            self.snapshot = snapshot;
            changed = true;
        }
        if changed {
            self.refresh_heatmap();
        }
    }

    fn refresh_heatmap(&mut self) {
        self.heatmap = room_heatmap(
            &self.snapshot,
            &self.session.member_id,
            self.grid.selection(),
            &self.grid_config,
        );
    }

    fn refresh_members(&mut self, app: &AppContext) {
        match app.room_service().list_members(&self.room.code) {
            Ok(members) => self.members = members,
            Err(e) => log::warn!("Failed to refresh members of {}: {}", self.room.code, e),
        }
    }

    /// Polls the store, flushes due saves and schedules the next repaint.
    fn tick(&mut self, ctx: &egui::Context, app: &AppContext, toasts: &mut ToastManager) {
        let now = Instant::now();
        let poll_interval = Duration::from_millis(app.config().poll_interval_ms);

        if now.duration_since(self.last_poll) >= poll_interval {
            self.last_poll = now;
            if let Err(e) = app.room_sync().poll() {
                log::warn!("Polling room {} failed: {}", self.room.code, e);
            }
            self.refresh_members(app);
        }
        self.drain_updates();

        let flush = self.save_queue.flush_due(now, app.room_sync());
        if let Some(err) = &flush.error {
            if !err.is_retryable() {
                toasts.error(format!("저장할 수 없습니다: {}", err));
            }
        }
        self.report_status_change(toasts);

        let next_poll = poll_interval.saturating_sub(now.duration_since(self.last_poll));
        let wait = flush
            .next_due_in
            .map_or(next_poll, |due| due.min(next_poll));
        ctx.request_repaint_after(wait);
    }

    fn report_status_change(&mut self, toasts: &mut ToastManager) {
        let status = self.save_queue.status().clone();
        let recovered = matches!(self.last_reported, Some(SaveStatus::Failed { .. }))
            && status == SaveStatus::Saved;
        if recovered {
            toasts.success("다시 저장되었습니다");
        }
        self.last_reported = Some(status);
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        app: &AppContext,
        palette: &HeatPalette,
        toasts: &mut ToastManager,
    ) -> RoomAction {
        self.tick(ctx, app, toasts);

        let mut action = RoomAction::Stay;
        self.render_sidebar(ctx, app, &mut action);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.room.title.as_str());
            ui.label(
                egui::RichText::new("가능한 시간을 드래그해서 표시하세요")
                    .small()
                    .weak(),
            );
            ui.add_space(6.0);

            // Touch drags on the grid must not scroll the page underneath.
            egui::ScrollArea::vertical()
                .drag_to_scroll(!self.tracker.is_active())
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let view = SlotGridView {
                        config: &app.config().grid,
                        heatmap: &self.heatmap,
                        palette,
                        heat_cap: app.config().heat_cap,
                    };
                    let output = view.show(ui, &mut self.grid, &mut self.tracker);

                    for committed in output.commits {
                        let revision = self.save_queue.push(committed, Instant::now());
                        log::debug!("Queued selection revision {}", revision);
                    }
                });
        });

        // Always reflect the in-progress drag, not only commits.
        self.refresh_heatmap();
        action
    }

    /// Writes any queued selection immediately. Used when leaving the room
    /// and on shutdown.
    pub fn flush(&mut self, sync: &dyn RoomSync) {
        if let Some(committed) = self.grid.end() {
            self.save_queue.push(committed, Instant::now());
        }
        if let Err(e) = self.save_queue.flush_now(sync) {
            log::error!("Failed to save selection for room {}: {}", self.room.code, e);
        }
    }
}
