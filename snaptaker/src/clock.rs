//! Host clock seam
//!
//! The host exposes two counters: an absolute game time that only ever
//! increments (used for snapshot labels) and a day-time counter whose value
//! modulo the cycle length is the time of day. The day-time counter may jump
//! forward, e.g. when a night is skipped.

use crate::detector::TickSample;

pub trait ClockSource {
    /// Absolute, monotonically increasing tick counter
    fn game_time(&self) -> u64;

    /// Day-time counter; `full_time % CYCLE_LENGTH` is the time of day
    fn full_time(&self) -> u64;

    fn sample(&self) -> TickSample {
        TickSample::from_full_time(self.full_time())
    }
}
