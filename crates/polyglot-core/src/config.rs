use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::PolyglotError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub titles: TitlesConfig,
    pub translation: TranslationConfig,
    pub tracks: TracksConfig,
}

/// Title restoration: oEmbed endpoint, caches and batch throttling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitlesConfig {
    pub oembed_endpoint: String,
    pub timeout_ms: u64,
    pub positive_cache_size: usize,
    pub negative_ttl_secs: u64,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    /// Video IDs whose per-item decisions are logged at info level.
    #[serde(default)]
    pub probe_video_ids: Vec<String>,
}

impl TitlesConfig {
    pub fn negative_ttl(&self) -> Duration {
        Duration::from_secs(self.negative_ttl_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub provider_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksConfig {
    pub system_language: String,
}

impl AppConfig {
    /// Load config: user file if it exists, otherwise the built-in defaults.
    pub fn load() -> Result<Self, PolyglotError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| PolyglotError::Config(e.to_string()))
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, PolyglotError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PolyglotError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| PolyglotError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), PolyglotError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PolyglotError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| PolyglotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the preferences database.
    pub fn db_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("polyglot.db"))
            .unwrap_or_else(|| PathBuf::from("polyglot.db"))
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path() -> Result<PathBuf, PolyglotError> {
        let path = Self::db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "polyglot")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
