use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

const APP_DIR: &str = "nba-live-stats";
const GAME_ID_PLACEHOLDER: &str = "{game_id}";
const MIN_REFRESH_SECONDS: u64 = 5;
const MAX_REFRESH_SECONDS: u64 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_scoreboard_url")]
    pub scoreboard_url: String,

    /// Must contain `{game_id}`.
    #[serde(default = "default_boxscore_url_template")]
    pub boxscore_url_template: String,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,

    #[serde(default = "default_max_concurrent_boxscores")]
    pub max_concurrent_boxscores: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("nba_live_stats.db").to_string_lossy().to_string()
}

fn default_scoreboard_url() -> String {
    "https://nba-prod-us-east-1-mediaops-stats.s3.amazonaws.com/NBA/liveData/scoreboard/todaysScoreboard_00.json"
        .to_string()
}

fn default_boxscore_url_template() -> String {
    "https://cdn.nba.com/static/json/liveData/boxscore/boxscore_{game_id}.json".to_string()
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_max_concurrent_boxscores() -> usize {
    5
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            scoreboard_url: default_scoreboard_url(),
            boxscore_url_template: default_boxscore_url_template(),
            refresh_interval_seconds: default_refresh_interval(),
            max_concurrent_boxscores: default_max_concurrent_boxscores(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.scoreboard_url)
            .map_err(|e| AppError::Config(format!("invalid scoreboard_url: {}", e)))?;

        if !self.boxscore_url_template.contains(GAME_ID_PLACEHOLDER) {
            return Err(AppError::Config(format!(
                "boxscore_url_template must contain {}",
                GAME_ID_PLACEHOLDER
            )));
        }
        self.boxscore_url("0")?;

        if self.max_concurrent_boxscores == 0 {
            return Err(AppError::Config(
                "max_concurrent_boxscores must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn boxscore_url(&self, game_id: &str) -> Result<Url> {
        let raw = self.boxscore_url_template.replace(GAME_ID_PLACEHOLDER, game_id);
        Url::parse(&raw).map_err(|e| AppError::Config(format!("invalid boxscore url {}: {}", raw, e)))
    }

    /// Poll interval, clamped to 5..=120 seconds.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(
            self.refresh_interval_seconds
                .clamp(MIN_REFRESH_SECONDS, MAX_REFRESH_SECONDS),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
