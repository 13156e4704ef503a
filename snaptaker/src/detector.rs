//! Day-boundary detection over the host's cycling time-of-day counter
//!
//! The detector is fed one [`TickSample`] per host tick and answers with the
//! intent for that tick: nothing, a pre-warning shortly before the day
//! boundary, or a snapshot trigger once the counter wraps around.
//!
//! # Cadence
//!
//! Exactly one trigger fires per in-world day. The cadence follows the
//! simulation clock, not the wall clock: if operators freeze time no backup
//! fires, and if time is fast-forwarded backups fire in a burst.
//!
//! # Pre-warning
//!
//! The pre-warning fires when the counter crosses
//! `CYCLE_LENGTH - prewarn_window`, at most once per day index. A second
//! path, [`DayBoundaryDetector::observe_ready`], lets the sleep-state event
//! raise the same warning, deduplicated against the tick path.

use serde::Serialize;

use crate::constants::clock::{CYCLE_LENGTH, PREWARN_WINDOW};

/// One sample of the host clock, taken once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSample {
    full_time: u64,
}

impl TickSample {
    pub const fn from_full_time(full_time: u64) -> Self {
        Self { full_time }
    }

    /// Time of day, always in `[0, CYCLE_LENGTH)`
    pub const fn cycle_time(&self) -> u64 {
        self.full_time % CYCLE_LENGTH
    }

    /// Index of the in-world day this sample falls into
    pub const fn day(&self) -> u64 {
        self.full_time / CYCLE_LENGTH
    }

    pub const fn full_time(&self) -> u64 {
        self.full_time
    }
}

/// Intent returned for a single observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DayEvent {
    None,
    PreWarn,
    Trigger,
}

#[derive(Debug, Clone)]
pub struct DayBoundaryDetector {
    prewarn_window: u64,
    last_cycle_time: Option<u64>,
    last_warned_day: Option<u64>,
}

impl DayBoundaryDetector {
    pub fn new() -> Self {
        Self::with_prewarn_window(PREWARN_WINDOW)
    }

    /// `prewarn_window` is clamped into `[1, CYCLE_LENGTH - 1]`
    pub fn with_prewarn_window(prewarn_window: u64) -> Self {
        Self {
            prewarn_window: prewarn_window.clamp(1, CYCLE_LENGTH - 1),
            last_cycle_time: None,
            last_warned_day: None,
        }
    }

    pub fn observe(&mut self, sample: TickSample) -> DayEvent {
        let current = sample.cycle_time();
        let day = sample.day();
        let threshold = CYCLE_LENGTH - self.prewarn_window;

        let event = match self.last_cycle_time {
            None => DayEvent::None,
            Some(previous) if current < previous => DayEvent::Trigger,
            Some(previous)
                if previous < threshold
                    && current >= threshold
                    && self.last_warned_day != Some(day) =>
            {
                self.last_warned_day = Some(day);
                DayEvent::PreWarn
            }
            Some(_) => DayEvent::None,
        };

        self.last_cycle_time = Some(current);
        event
    }

    /// Secondary pre-warn path, raised when enough participants are ready
    /// to skip the night. Never fires twice for the same day.
    pub fn observe_ready(&mut self, sample: TickSample) -> DayEvent {
        let day = sample.day();
        if self.last_warned_day == Some(day) {
            return DayEvent::None;
        }
        self.last_warned_day = Some(day);
        DayEvent::PreWarn
    }

    pub fn last_cycle_time(&self) -> Option<u64> {
        self.last_cycle_time
    }

    pub fn last_warned_day(&self) -> Option<u64> {
        self.last_warned_day
    }

    /// Forget every sample, as after a host restart
    pub fn reset(&mut self) {
        self.last_cycle_time = None;
        self.last_warned_day = None;
    }
}

impl Default for DayBoundaryDetector {
    fn default() -> Self {
        Self::new()
    }
}
