//! Participant departure tracking for the post-snapshot notice
//!
//! Only the most recent departure matters. After a successful snapshot the
//! orchestrator asks whether someone left recently and, if so, consumes the
//! entry so the same departure is never announced twice.

use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ActivityTracker {
    last_departure_at_millis: Option<i64>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_departure(&mut self, at_millis: i64) {
        self.last_departure_at_millis = Some(at_millis);
        debug!("Recorded participant departure at {}", at_millis);
    }

    /// True when the last departure happened within `window_millis` of `now_millis`
    pub fn should_notify_departure(&self, now_millis: i64, window_millis: i64) -> bool {
        match self.last_departure_at_millis {
            Some(at) => now_millis.saturating_sub(at) <= window_millis,
            None => false,
        }
    }

    /// Clear the recorded departure; returns the consumed timestamp
    pub fn consume(&mut self) -> Option<i64> {
        self.last_departure_at_millis.take()
    }

    pub fn last_departure_at_millis(&self) -> Option<i64> {
        self.last_departure_at_millis
    }
}
