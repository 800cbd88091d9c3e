use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ReviewbotError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub api: ApiConfig,
    pub telegram: TelegramConfig,
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string(),
            timeout_ms: 30000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub timeout_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self { timeout_ms: 30000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Flat delay between cycles, success or failure
    pub period_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { period_secs: 600 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            api: ApiConfig::default(),
            telegram: TelegramConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Credential set read once at startup, immutable afterwards.
///
/// All three values must be present and non-empty; anything missing is a
/// fatal configuration error naming the offending variables.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl Credentials {
    pub const PRACTICUM_TOKEN_VAR: &'static str = "PRACTICUM_TOKEN";
    pub const TELEGRAM_TOKEN_VAR: &'static str = "TELEGRAM_TOKEN";
    pub const TELEGRAM_CHAT_ID_VAR: &'static str = "TELEGRAM_CHAT_ID";

    /// Read all three credentials from the process environment
    pub fn from_env() -> crate::Result<Self> {
        let mut missing = Vec::new();

        let practicum_token = Self::read_var(Self::PRACTICUM_TOKEN_VAR, &mut missing);
        let telegram_token = Self::read_var(Self::TELEGRAM_TOKEN_VAR, &mut missing);
        let telegram_chat_id = Self::read_var(Self::TELEGRAM_CHAT_ID_VAR, &mut missing);

        if !missing.is_empty() {
            return Err(ReviewbotError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
        })
    }

    fn read_var(name: &str, missing: &mut Vec<String>) -> String {
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => value,
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        }
    }
}
