use crate::question::Difficulty;
use crate::session::{Mode, SessionConfig, TARGET_MAX, TARGET_MIN};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Last-used settings persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub target: i32,
    pub round_secs: u64,
    pub left_name: String,
    pub right_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::PvBot,
            difficulty: Difficulty::Mid,
            target: 8,
            round_secs: 15,
            left_name: "YOU".to_string(),
            right_name: "BOT".to_string(),
        }
    }
}

impl Config {
    pub fn to_session_config(&self) -> SessionConfig {
        let right_name = match self.mode {
            Mode::PvBot => "BOT".to_string(),
            Mode::PvP => self.right_name.clone(),
        };
        SessionConfig {
            mode: self.mode,
            difficulty: self.difficulty,
            left_name: self.left_name.clone(),
            right_name,
            target: self.target.clamp(TARGET_MIN, TARGET_MAX),
            round_limit: Duration::from_secs(self.round_secs.max(1)),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "tugmath") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("tugmath_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
