//! Debounced, retrying persistence of the local member's selection.
//!
//! Every gesture commit is pushed here with a fresh revision. Only the
//! latest push is kept; it is written once the user has been idle for
//! the debounce window. A failed write keeps the selection queued and
//! retries with exponential backoff, so local state is never rolled back.

use std::time::{Duration, Instant};

use crate::models::selection::SelectionSet;
use crate::services::room_sync::{RevisionClock, RoomSync, SyncError};

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
const BASE_RETRY_MS: u64 = 1_000;
const MAX_RETRY_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Pending,
    Failed { attempts: u32, message: String },
}

impl SaveStatus {
    pub fn label(&self) -> String {
        match self {
            SaveStatus::Saved => "저장됨".to_string(),
            SaveStatus::Pending => "저장 중…".to_string(),
            SaveStatus::Failed { attempts, .. } => format!("저장 실패 ({}회)", attempts),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingSave {
    selection: SelectionSet,
    revision: i64,
    due_at: Option<Instant>,
}

#[derive(Debug, Clone, Default)]
pub struct FlushResult {
    pub attempted: bool,
    pub error: Option<SyncError>,
    pub next_due_in: Option<Duration>,
}

pub struct SaveQueue {
    room_code: String,
    member_id: String,
    debounce: Duration,
    clock: RevisionClock,
    pending: Option<PendingSave>,
    consecutive_failures: u32,
    status: SaveStatus,
}

impl SaveQueue {
    pub fn new(room_code: impl Into<String>, member_id: impl Into<String>) -> Self {
        Self::with_debounce(room_code, member_id, Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    pub fn with_debounce(
        room_code: impl Into<String>,
        member_id: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        Self {
            room_code: room_code.into(),
            member_id: member_id.into(),
            debounce,
            clock: RevisionClock::new(),
            pending: None,
            consecutive_failures: 0,
            status: SaveStatus::Saved,
        }
    }

    /// Continues numbering after a revision the store already holds for
    /// this member, e.g. one written by a previous run.
    pub fn resume_after(&mut self, revision: i64) {
        self.clock = RevisionClock::resume_after(revision);
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_revision(&self) -> Option<i64> {
        self.pending.as_ref().map(|p| p.revision)
    }

    /// Queues `selection` as the newest committed value, replacing any
    /// earlier one that has not been written yet.
    pub fn push(&mut self, selection: SelectionSet, now: Instant) -> i64 {
        let revision = self.clock.next();
        self.pending = Some(PendingSave {
            selection,
            revision,
            due_at: Some(now + self.debounce),
        });
        self.status = SaveStatus::Pending;
        revision
    }

    /// Writes the queued selection if its debounce or retry delay has
    /// passed at `now`.
    pub fn flush_due(&mut self, now: Instant, sync: &dyn RoomSync) -> FlushResult {
        let is_due = self
            .pending
            .as_ref()
            .and_then(|p| p.due_at)
            .is_some_and(|due_at| now >= due_at);

        if !is_due {
            return FlushResult {
                next_due_in: self.next_due_in(now),
                ..FlushResult::default()
            };
        }

        let error = self.attempt(now, sync).err();
        FlushResult {
            attempted: true,
            error,
            next_due_in: self.next_due_in(now),
        }
    }

    /// Writes the queued selection immediately, ignoring any delay.
    pub fn flush_now(&mut self, sync: &dyn RoomSync) -> Result<(), SyncError> {
        if self.pending.is_none() {
            return Ok(());
        }
        self.attempt(Instant::now(), sync)
    }

    fn attempt(&mut self, now: Instant, sync: &dyn RoomSync) -> Result<(), SyncError> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };

        match sync.save_selection(
            &self.room_code,
            &self.member_id,
            &pending.selection,
            pending.revision,
        ) {
            Ok(()) => {
                log::debug!(
                    "Saved {} slots for {} (revision {})",
                    pending.selection.len(),
                    self.member_id,
                    pending.revision
                );
                self.pending = None;
                self.consecutive_failures = 0;
                self.status = SaveStatus::Saved;
                Ok(())
            }
            Err(err) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                pending.due_at = if err.is_retryable() {
                    Some(now + Self::calculate_backoff(self.consecutive_failures))
                } else {
                    None
                };
                log::warn!(
                    "Saving selection for room {} failed (attempt {}): {}",
                    self.room_code,
                    self.consecutive_failures,
                    err
                );
                self.status = SaveStatus::Failed {
                    attempts: self.consecutive_failures,
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    fn next_due_in(&self, now: Instant) -> Option<Duration> {
        let due_at = self.pending.as_ref()?.due_at?;
        Some(due_at.saturating_duration_since(now))
    }

    fn calculate_backoff(failures: u32) -> Duration {
        if failures == 0 {
            return Duration::from_millis(BASE_RETRY_MS);
        }

        let factor = 2_u64.saturating_pow(failures.saturating_sub(1).min(10));
        let backoff = BASE_RETRY_MS.saturating_mul(factor);
        Duration::from_millis(backoff.min(MAX_RETRY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slot::SlotKey;
    use crate::services::room_sync::MockRoomSync;
    use mockall::predicate::eq;

    fn keys(raw: &[&str]) -> SelectionSet {
        raw.iter().map(|k| k.parse::<SlotKey>().unwrap()).collect()
    }

    fn queue() -> SaveQueue {
        SaveQueue::with_debounce("ROOM01", "me", Duration::from_millis(300))
    }

    #[test]
    fn test_nothing_is_saved_before_debounce() {
        let mut sync = MockRoomSync::new();
        sync.expect_save_selection().never();

        let start = Instant::now();
        let mut queue = queue();
        queue.push(keys(&["0-0"]), start);

        let result = queue.flush_due(start + Duration::from_millis(299), &sync);
        assert!(!result.attempted);
        assert_eq!(result.next_due_in, Some(Duration::from_millis(1)));
        assert_eq!(queue.status(), &SaveStatus::Pending);
    }

    #[test]
    fn test_rapid_commits_coalesce_into_one_save() {
        let start = Instant::now();
        let mut queue = queue();
        queue.push(keys(&["0-0"]), start);
        queue.push(keys(&["0-0", "0-1"]), start + Duration::from_millis(100));
        let revision = queue.push(keys(&["0-1"]), start + Duration::from_millis(200));

        let mut sync = MockRoomSync::new();
        sync.expect_save_selection()
            .with(eq("ROOM01"), eq("me"), eq(keys(&["0-1"])), eq(revision))
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        // Still inside the window opened by the last push.
        assert!(!queue.flush_due(start + Duration::from_millis(400), &sync).attempted);
        assert!(queue.flush_due(start + Duration::from_millis(500), &sync).attempted);
        assert_eq!(queue.status(), &SaveStatus::Saved);
        assert!(!queue.has_pending());
    }

    #[test]
    fn test_revisions_increase_per_push() {
        let now = Instant::now();
        let mut queue = queue();
        let first = queue.push(keys(&["0-0"]), now);
        let second = queue.push(keys(&["0-1"]), now);
        assert!(second > first);
    }

    #[test]
    fn test_failure_keeps_selection_and_backs_off() {
        let start = Instant::now();
        let mut queue = queue();
        queue.push(keys(&["2-2"]), start);

        let mut failing = MockRoomSync::new();
        failing
            .expect_save_selection()
            .times(1)
            .returning(|_, _, _, _| Err(SyncError::Unavailable("offline".to_string())));

        let due = start + Duration::from_millis(300);
        let result = queue.flush_due(due, &failing);
        assert!(result.attempted);
        assert_eq!(
            result.error,
            Some(SyncError::Unavailable("offline".to_string()))
        );
        assert_eq!(result.next_due_in, Some(Duration::from_millis(BASE_RETRY_MS)));
        assert!(queue.has_pending());
        assert!(matches!(
            queue.status(),
            SaveStatus::Failed { attempts: 1, .. }
        ));

        let mut recovered = MockRoomSync::new();
        recovered
            .expect_save_selection()
            .with(eq("ROOM01"), eq("me"), eq(keys(&["2-2"])), mockall::predicate::always())
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        assert!(!queue.flush_due(due + Duration::from_millis(999), &recovered).attempted);
        assert!(queue.flush_due(due + Duration::from_millis(1_000), &recovered).attempted);
        assert_eq!(queue.status(), &SaveStatus::Saved);
    }

    #[test]
    fn test_unknown_room_stops_retrying() {
        let start = Instant::now();
        let mut queue = queue();
        queue.push(keys(&["0-0"]), start);

        let mut sync = MockRoomSync::new();
        sync.expect_save_selection()
            .times(1)
            .returning(|room, _, _, _| Err(SyncError::UnknownRoom(room.to_string())));

        let result = queue.flush_due(start + Duration::from_millis(300), &sync);
        assert!(result.attempted);
        assert_eq!(result.next_due_in, None);
        assert!(!queue.flush_due(start + Duration::from_secs(600), &sync).attempted);
        assert!(queue.has_pending());
    }

    #[test]
    fn test_flush_now_ignores_debounce() {
        let mut queue = queue();
        queue.push(keys(&["6-29"]), Instant::now());

        let mut sync = MockRoomSync::new();
        sync.expect_save_selection()
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        queue.flush_now(&sync).unwrap();
        assert_eq!(queue.status(), &SaveStatus::Saved);
        queue.flush_now(&sync).unwrap();
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        assert_eq!(SaveQueue::calculate_backoff(1), Duration::from_secs(1));
        assert_eq!(SaveQueue::calculate_backoff(2), Duration::from_secs(2));
        assert_eq!(SaveQueue::calculate_backoff(3), Duration::from_secs(4));
        assert_eq!(SaveQueue::calculate_backoff(20), Duration::from_secs(30));
    }

    #[test]
    fn test_resume_after_continues_revisions() {
        let mut queue = queue();
        let far_future = i64::MAX / 2;
        queue.resume_after(far_future);
        assert_eq!(queue.push(keys(&["0-0"]), Instant::now()), far_future + 1);
    }
}
