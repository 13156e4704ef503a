pub mod manager;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{activity, clock, defaults, protocol};

pub use manager::ConfigManager;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    #[serde(default = "default_protocol_timeout")]
    pub protocol_timeout_seconds: u64,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_per_second: u64,
    #[serde(default = "default_prewarn_window")]
    pub prewarn_window_ticks: u64,
    #[serde(default = "default_departure_window")]
    pub departure_window_seconds: u64,
    #[serde(default = "default_sleeping_percentage")]
    pub players_sleeping_percentage: u32,
    #[serde(default = "default_sleep_ticks")]
    pub sleep_ticks_to_skip_night: u64,
    // Empty disables operator notifications
    #[serde(default)]
    pub operator_webhook_url: String,
    #[serde(default = "default_departure_command")]
    pub departure_operator_command: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    pub worlds: Vec<WorldConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub name: String,
}

impl Config {
    pub fn protocol_timeout(&self) -> Duration {
        Duration::from_secs(self.protocol_timeout_seconds)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.tick_rate_per_second.max(1))
    }

    pub fn departure_window_millis(&self) -> i64 {
        (self.departure_window_seconds as i64).saturating_mul(1000)
    }

    /// The first configured world drives the clock and the snapshot label
    pub fn primary_world(&self) -> Option<&WorldConfig> {
        self.worlds.first()
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=clock::MAX_TICKS_PER_SECOND).contains(&self.tick_rate_per_second) {
            return Err(format!(
                "tick_rate_per_second must be between 1 and {}",
                clock::MAX_TICKS_PER_SECOND
            ));
        }
        if self.protocol_timeout_seconds == 0 {
            return Err("protocol_timeout_seconds must be at least 1".to_string());
        }
        if self.prewarn_window_ticks == 0 || self.prewarn_window_ticks >= clock::CYCLE_LENGTH {
            return Err(format!(
                "prewarn_window_ticks must be between 1 and {}",
                clock::CYCLE_LENGTH - 1
            ));
        }
        if self.players_sleeping_percentage > 100 {
            return Err("players_sleeping_percentage must not exceed 100".to_string());
        }
        if self.worlds.is_empty() {
            return Err("at least one [[worlds]] entry is required".to_string());
        }
        for (i, world) in self.worlds.iter().enumerate() {
            if world.name.trim().is_empty() {
                return Err(format!("world #{} has an empty name", i + 1));
            }
            if self.worlds[..i].iter().any(|w| w.name == world.name) {
                return Err(format!("duplicate world name '{}'", world.name));
            }
        }
        Ok(())
    }
}

fn default_host() -> String {
    defaults::HOST.to_string()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_socket_path() -> PathBuf {
    PathBuf::from(protocol::DEFAULT_SOCKET_PATH)
}

fn default_protocol_timeout() -> u64 {
    defaults::PROTOCOL_TIMEOUT_SECONDS
}

fn default_tick_rate() -> u64 {
    clock::TICKS_PER_SECOND
}

fn default_prewarn_window() -> u64 {
    clock::PREWARN_WINDOW
}

fn default_departure_window() -> u64 {
    defaults::DEPARTURE_WINDOW_SECONDS
}

fn default_sleeping_percentage() -> u32 {
    defaults::PLAYERS_SLEEPING_PERCENTAGE
}

fn default_sleep_ticks() -> u64 {
    clock::SLEEP_TICKS_TO_SKIP_NIGHT
}

fn default_departure_command() -> String {
    activity::DEFAULT_DEPARTURE_COMMAND.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(defaults::DATA_DIR)
}
