use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::roster::Position;
use crate::errors::FlushError;
use crate::flusher::PersistenceDomain;

const LEVEL_FILE: &str = "level.json";
const LEVEL_TMP_FILE: &str = "level.json.tmp";

/// On-disk level record of one world
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub game_time: u64,
    pub full_time: u64,
    #[serde(default)]
    pub participants: BTreeMap<String, Position>,
    pub saved_at: Option<DateTime<Utc>>,
}

/// A loaded world: in-memory level state backed by `<data_dir>/<name>/level.json`
#[derive(Debug)]
pub struct World {
    dir: PathBuf,
    level: LevelData,
}

impl World {
    /// Load the world from disk, or start empty when it has never been saved
    pub fn load(data_dir: &Path, name: &str) -> Result<Self> {
        let dir = data_dir.join(name);
        let path = dir.join(LEVEL_FILE);

        let level = if path.exists() {
            let content = fs::read(&path)
                .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
            let level: LevelData = serde_json::from_slice(&content)
                .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?;
            info!(
                "Loaded world {} (game time {}, day time {})",
                name, level.game_time, level.full_time
            );
            level
        } else {
            debug!("World {} has no saved level, starting fresh", name);
            LevelData {
                name: name.to_string(),
                ..LevelData::default()
            }
        };

        Ok(Self { dir, level })
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn set_clock(&mut self, game_time: u64, full_time: u64) {
        self.level.game_time = game_time;
        self.level.full_time = full_time;
    }

    pub fn set_participant(&mut self, name: &str, position: Position) {
        self.level.participants.insert(name.to_string(), position);
    }

    fn io_error(&self, source: std::io::Error) -> FlushError {
        FlushError::Domain {
            domain: self.level.name.clone(),
            source,
        }
    }
}

impl PersistenceDomain for World {
    fn name(&self) -> &str {
        &self.level.name
    }

    // Always writes the full state
    fn flush(&mut self) -> Result<(), FlushError> {
        let mut level = self.level.clone();
        level.saved_at = Some(Utc::now());

        let encoded = serde_json::to_vec_pretty(&level).map_err(|e| FlushError::Encode {
            domain: level.name.clone(),
            reason: e.to_string(),
        })?;

        fs::create_dir_all(&self.dir).map_err(|e| self.io_error(e))?;

        let tmp_path = self.dir.join(LEVEL_TMP_FILE);
        let mut file = File::create(&tmp_path).map_err(|e| self.io_error(e))?;
        file.write_all(&encoded).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        drop(file);

        fs::rename(&tmp_path, self.dir.join(LEVEL_FILE)).map_err(|e| self.io_error(e))?;
        File::open(&self.dir)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| self.io_error(e))?;

        self.level = level;
        Ok(())
    }
}
