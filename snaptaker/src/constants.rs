//! Central repository for timing constants, protocol literals and
//! user-facing message text.
//!
//! Grouped by concern so the detector, protocol client and orchestrator
//! share a single source of truth.

use std::time::Duration;

/// In-world clock constants
pub mod clock {
    /// Length of one in-world day in ticks
    pub const CYCLE_LENGTH: u64 = 24_000;

    /// Nominal host tick rate
    pub const TICKS_PER_SECOND: u64 = 20;

    /// Ticks before the day boundary at which the pre-warning fires (5 real seconds)
    pub const PREWARN_WINDOW: u64 = 100;

    /// Ticks the sleepers must stay in bed before the night is skipped
    pub const SLEEP_TICKS_TO_SKIP_NIGHT: u64 = 100;

    /// First cycle time at which beds can be used
    pub const NIGHT_START: u64 = 12_542;

    /// Highest accepted host tick rate
    pub const MAX_TICKS_PER_SECOND: u64 = 1_000;
}

/// Snapshot daemon protocol constants
pub mod protocol {
    use super::Duration;

    /// Conventional location of the snapshot daemon socket
    pub const DEFAULT_SOCKET_PATH: &str = "/run/snapshotter/snapshot.sock";

    /// Prefix that marks a successful daemon response
    pub const SUCCESS_PREFIX: &str = "SUCCESS: ";

    /// Prefix of every snapshot label, followed by the absolute game time
    pub const LABEL_PREFIX: &str = "gt";

    /// Upper bound for one request/response exchange
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Read buffer size while draining the daemon response
    pub const READ_CHUNK_BYTES: usize = 1024;

    /// Largest daemon response accepted
    pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;
}

/// Departure heuristic constants
pub mod activity {
    /// A departure this recent (ms) counts as "someone just left"
    pub const DEPARTURE_WINDOW_MILLIS: i64 = 60_000;

    /// Operator command dispatched when the departure heuristic fires
    pub const DEFAULT_DEPARTURE_COMMAND: &str = "discord broadcast Morning has come";
}

/// Notification delivery constants
pub mod notify {
    /// Webhook request timeout
    pub const WEBHOOK_TIMEOUT_SECONDS: u64 = 10;

    /// Number of broadcasts retained for the status API
    pub const BROADCAST_HISTORY: usize = 100;
}

/// User-facing message text
pub mod messages {
    pub const PREWARN: &str = "A backup will be taken shortly";
    pub const BACKUP_FAILED_BROADCAST: &str = "Backup creation failed";
    pub const DAEMON_REJECTED: &str = "Snapshot creation failed";
    pub const PROTOCOL_FAILED: &str = "Failed to create snapshot";
    pub const FLUSH_FAILED: &str = "Failed to save worlds before snapshot";
    pub const CYCLE_BUSY: &str = "A snapshot is already in progress";
}

/// Default configuration values
pub mod defaults {
    pub const HOST: &str = "127.0.0.1";
    pub const PORT: u16 = 8096;
    pub const PROTOCOL_TIMEOUT_SECONDS: u64 = 60;
    pub const DEPARTURE_WINDOW_SECONDS: u64 = 60;
    pub const PLAYERS_SLEEPING_PERCENTAGE: u32 = 100;
    pub const DATA_DIR: &str = "data";
}
