use chrono::Utc;

/// Hands out strictly increasing save revisions based on wall-clock
/// milliseconds, so two saves from the same client never tie even
/// within one millisecond or across a backwards clock step.
#[derive(Debug, Clone, Default)]
pub struct RevisionClock {
    last: i64,
}

impl RevisionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts after a revision already known to the store.
    pub fn resume_after(last: i64) -> Self {
        Self { last }
    }

    pub fn next(&mut self) -> i64 {
        self.next_at(Utc::now().timestamp_millis())
    }

    pub fn next_at(&mut self, now_ms: i64) -> i64 {
        self.last = now_ms.max(self.last.saturating_add(1));
        self.last
    }
}
