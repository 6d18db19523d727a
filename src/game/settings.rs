use crate::error::Result;
use crate::model::{Difficulty, GameConfig, MismatchPolicy, SettingsChange};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DATA_DIR_ENV: &str = "SQUAREGAME_DATA_DIR";
const APP_DIR_NAME: &str = "squaregame";
const CURRENT_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    pub difficulty: Difficulty,

    /// Overrides the policy implied by `difficulty` when set.
    #[serde(default)]
    pub mismatch_policy: Option<MismatchPolicy>,

    #[serde(default = "default_player_name")]
    pub player_name: String,
}

// Helper functions for default values
fn default_version() -> u32 {
    1
}
fn default_player_name() -> String {
    "player".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: CURRENT_VERSION,
            difficulty: Difficulty::default(),
            mismatch_policy: None,
            player_name: default_player_name(),
        }
    }
}

impl Settings {
    /// Load from the data directory, falling back to (and writing) defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(contents) = fs::read_to_string(path) {
            match serde_json::from_str::<Settings>(&contents) {
                Ok(mut settings) => {
                    settings.migrate();
                    return settings;
                }
                Err(err) => {
                    warn!(target: "settings", "Ignoring unreadable settings {:?}: {}", path, err)
                }
            }
        }
        let default = Settings::default();
        if let Err(err) = default.save_to(path) {
            warn!(target: "settings", "Could not write default settings {:?}: {}", path, err);
        }
        default
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn settings_path() -> PathBuf {
        Self::data_dir().join("settings.json")
    }

    /// `$SQUAREGAME_DATA_DIR`, else the platform data directory.
    pub fn data_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR_NAME)
    }

    fn migrate(&mut self) {
        match self.version {
            // v1 had no player name; the serde default already filled it in
            0 | 1 => {
                self.version = CURRENT_VERSION;
            }
            _ => (),
        }
    }

    pub fn apply(&mut self, change: &SettingsChange) {
        if let Some(difficulty) = change.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(policy) = change.mismatch_policy {
            self.mismatch_policy = Some(policy);
        }
        if let Some(name) = &change.player_name {
            self.player_name = name.clone();
        }
    }

    pub fn game_config(&self) -> GameConfig {
        let config = GameConfig::for_difficulty(self.difficulty);
        match self.mismatch_policy {
            Some(policy) => config.with_mismatch_policy(policy),
            None => config,
        }
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.parse::<u64>().ok())
    }
}
