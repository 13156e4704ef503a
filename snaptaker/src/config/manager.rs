use super::Config;
use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load_configuration(config_dir.as_ref()).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn from_config(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &Path) -> Result<Config> {
        let main_config_path = config_dir.join("main.toml");
        let main_config_content = fs::read_to_string(&main_config_path)
            .await
            .map_err(|e| anyhow!("Failed to read main config {}: {}", main_config_path.display(), e))?;

        let config: Config = toml::from_str(&main_config_content)
            .map_err(|e| anyhow!("Failed to parse main config: {}", e))?;

        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration in {}: {}", main_config_path.display(), e))?;

        info!(
            "Loaded {} worlds, daemon socket {}, {} ticks/s",
            config.worlds.len(),
            config.socket_path.display(),
            config.tick_rate_per_second
        );

        Ok(config)
    }
}
