//! Test configuration builder for creating test configs programmatically

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use snaptaker::config::Config;

/// Builder for creating test configurations
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    socket_path: Option<PathBuf>,
    protocol_timeout_seconds: u64,
    tick_rate_per_second: u64,
    prewarn_window_ticks: u64,
    departure_window_seconds: u64,
    players_sleeping_percentage: u32,
    sleep_ticks_to_skip_night: u64,
    operator_webhook_url: Option<String>,
    worlds: Vec<String>,
    seeded: Vec<(String, u64, u64)>,
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            socket_path: None,
            protocol_timeout_seconds: 5,
            tick_rate_per_second: 20,
            prewarn_window_ticks: 100,
            departure_window_seconds: 60,
            players_sleeping_percentage: 100,
            sleep_ticks_to_skip_night: 100,
            operator_webhook_url: None,
            worlds: vec!["world".to_string()],
            seeded: Vec::new(),
        }
    }

    pub fn socket_path(mut self, path: &Path) -> Self {
        self.socket_path = Some(path.to_path_buf());
        self
    }

    pub fn protocol_timeout(mut self, seconds: u64) -> Self {
        self.protocol_timeout_seconds = seconds;
        self
    }

    pub fn tick_rate(mut self, ticks_per_second: u64) -> Self {
        self.tick_rate_per_second = ticks_per_second;
        self
    }

    pub fn sleeping_percentage(mut self, percentage: u32) -> Self {
        self.players_sleeping_percentage = percentage;
        self
    }

    pub fn sleep_ticks(mut self, ticks: u64) -> Self {
        self.sleep_ticks_to_skip_night = ticks;
        self
    }

    pub fn operator_webhook(mut self, url: &str) -> Self {
        self.operator_webhook_url = Some(url.to_string());
        self
    }

    pub fn worlds(mut self, names: &[&str]) -> Self {
        self.worlds = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Pre-write a saved level so the host clock starts at the given times
    pub fn seed_world(mut self, name: &str, game_time: u64, full_time: u64) -> Self {
        self.seeded.push((name.to_string(), game_time, full_time));
        self
    }

    /// Build and write config files to temp directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        let data_dir = self.temp_dir.path().join("data");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        let socket_path = self
            .socket_path
            .clone()
            .unwrap_or_else(|| self.temp_dir.path().join("missing.sock"));

        let mut main_toml = format!(
            r#"
host = "127.0.0.1"
port = 0
socket_path = "{}"
protocol_timeout_seconds = {}
tick_rate_per_second = {}
prewarn_window_ticks = {}
departure_window_seconds = {}
players_sleeping_percentage = {}
sleep_ticks_to_skip_night = {}
operator_webhook_url = "{}"
data_dir = "{}"
"#,
            socket_path.display(),
            self.protocol_timeout_seconds,
            self.tick_rate_per_second,
            self.prewarn_window_ticks,
            self.departure_window_seconds,
            self.players_sleeping_percentage,
            self.sleep_ticks_to_skip_night,
            self.operator_webhook_url.as_deref().unwrap_or(""),
            data_dir.display(),
        );
        for world in &self.worlds {
            main_toml.push_str(&format!("\n[[worlds]]\nname = \"{}\"\n", world));
        }
        fs::write(config_dir.join("main.toml"), main_toml).expect("Failed to write main.toml");

        for (name, game_time, full_time) in &self.seeded {
            let world_dir = data_dir.join(name);
            fs::create_dir_all(&world_dir).expect("Failed to create world dir");
            let level = serde_json::json!({
                "name": name,
                "game_time": game_time,
                "full_time": full_time,
                "participants": {},
                "saved_at": null
            });
            fs::write(world_dir.join("level.json"), level.to_string())
                .expect("Failed to write level.json");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
            data_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Built test configuration; files live as long as this value
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl TestConfig {
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("main.toml")
    }

    /// Parse and validate the written main.toml
    pub fn load(&self) -> Arc<Config> {
        let content = fs::read_to_string(self.config_path()).expect("Failed to read main.toml");
        let config: Config = toml::from_str(&content).expect("Failed to parse main.toml");
        config.validate().expect("Invalid test config");
        Arc::new(config)
    }

    /// Saved level of a world as raw JSON
    pub fn read_level(&self, world: &str) -> serde_json::Value {
        let content = fs::read_to_string(self.data_dir.join(world).join("level.json"))
            .expect("Failed to read level.json");
        serde_json::from_str(&content).expect("Failed to parse level.json")
    }
}
