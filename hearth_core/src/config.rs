use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

static DATA_DIR_NAME: &str = "hearth";
static HEARTH_DB_NAME: &str = "hearth.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";
static DATA_DIR_ENV: &str = "HEARTH_DATA_DIR";

// data_dir_path (or $HEARTH_DATA_DIR)
// |- hearth
//    |- hearth.sqlite
//    |- config.json

/// Terms rejected by the content filter unless the config overrides them.
pub const DEFAULT_DISALLOWED_TERMS: &[&str] = &["垃圾", "傻逼", "白痴", "蠢货", "滚", "去死"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to find a data directory on this platform")]
    NoDataDir,
    #[error("config file io error")]
    Io(#[from] std::io::Error),
    #[error("malformed config file")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HearthConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    pub database_url: String,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub content: ContentSettings,

    #[serde(default)]
    pub verification: VerificationSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Posts plus replies allowed inside one window.
    pub max_count: u64,
    pub window_minutes: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_count: 3,
            window_minutes: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ContentSettings {
    pub min_length: usize,
    /// Longer content is truncated, not rejected.
    pub max_length: usize,
    pub disallowed_terms: Vec<String>,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            min_length: 2,
            max_length: 5000,
            disallowed_terms: DEFAULT_DISALLOWED_TERMS
                .iter()
                .map(|term| term.to_string())
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct VerificationSettings {
    pub code_ttl_minutes: i64,
    pub sms_max_attempts: u32,
    pub sms_backoff_ms: u64,
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            code_ttl_minutes: 5,
            sms_max_attempts: 3,
            sms_backoff_ms: 200,
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

impl HearthConfig {
    /// Creates a config with defaults and a SQLite database inside `data_dir`
    pub fn new(data_dir: &Path) -> Self {
        let database_path = data_dir.join(HEARTH_DB_NAME);

        HearthConfig {
            bind_addr: default_bind_addr(),
            database_url: format!("sqlite://{}?mode=rwc", database_path.display()),
            rate_limit: RateLimitSettings::default(),
            content: ContentSettings::default(),
            verification: VerificationSettings::default(),
        }
    }

    /// In-memory database, used by tests and throwaway instances.
    pub fn in_memory() -> Self {
        HearthConfig {
            database_url: "sqlite::memory:".to_string(),
            ..HearthConfig::new(Path::new("."))
        }
    }
}

fn hearth_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
    Ok(data_dir.join(DATA_DIR_NAME))
}

/// Gets the existing config or initializes a new one if it doesn't exist
pub async fn get_or_init() -> Result<HearthConfig, ConfigError> {
    load_or_init(&hearth_dir()?).await
}

pub async fn load_or_init(hearth_dir: &Path) -> Result<HearthConfig, ConfigError> {
    let config_path = hearth_dir.join(CONFIG_FILE_NAME);

    fs::create_dir_all(hearth_dir).await?;

    if config_path.exists() {
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        let config: HearthConfig = serde_json::from_str(&contents)?;
        Ok(config)
    } else {
        let config = HearthConfig::new(hearth_dir);

        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;

        Ok(config)
    }
}
