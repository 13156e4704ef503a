use serde::Serialize;

use crate::clock::ClockSource;
use crate::constants::clock::CYCLE_LENGTH;

/// Simulated host clock, advanced once per tick by the host runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimClock {
    game_time: u64,
    full_time: u64,
}

impl SimClock {
    pub fn new(game_time: u64, full_time: u64) -> Self {
        Self {
            game_time,
            full_time,
        }
    }

    pub fn advance(&mut self) {
        self.game_time = self.game_time.saturating_add(1);
        self.full_time = self.full_time.saturating_add(1);
    }

    /// Jump the day-time counter to the start of the next day; game time
    /// is untouched
    pub fn skip_to_next_day(&mut self) {
        let next_day = self.full_time / CYCLE_LENGTH + 1;
        self.full_time = next_day.saturating_mul(CYCLE_LENGTH);
    }
}

impl ClockSource for SimClock {
    fn game_time(&self) -> u64 {
        self.game_time
    }

    fn full_time(&self) -> u64 {
        self.full_time
    }
}
