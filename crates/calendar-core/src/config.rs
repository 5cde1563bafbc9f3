//! Runtime configuration for the calendar assistant.
//!
//! All settings come from the process environment, optionally seeded from a
//! `.env` file in the working directory.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_TOKEN`: Bot token from @BotFather
//! - `OPENAI_API_KEY`: Key for the chat-completions API
//! - `GOOGLE_CREDENTIALS_FILE`: Path to a Google credentials JSON file
//! - `GOOGLE_CALENDAR_ID`: Calendar to operate on
//!
//! Optional:
//! - `PORT`: Health endpoint port (default: 8080)
//! - `OPENAI_MODEL`: Model to use (default: gpt-4o-mini)
//! - `OPENAI_API_URL`: Chat-completions endpoint (default: OpenAI)
//! - `DATA_DIR`: Conversation log directory (default: ./data)
//! - `CLEANUP_DAYS`: Drop interactions older than this many days

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Environment variable for the Telegram bot token.
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";

/// Environment variable for the LLM API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable for the Google credentials file path.
pub const GOOGLE_CREDENTIALS_ENV: &str = "GOOGLE_CREDENTIALS_FILE";

/// Environment variable for the Google calendar ID.
pub const CALENDAR_ID_ENV: &str = "GOOGLE_CALENDAR_ID";

/// Environment variable for the health endpoint port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable for the model name.
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";

/// Environment variable for the chat-completions endpoint.
pub const OPENAI_API_URL_ENV: &str = "OPENAI_API_URL";

/// Environment variable for the data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable for the interaction retention period.
pub const CLEANUP_DAYS_ENV: &str = "CLEANUP_DAYS";

/// Default health endpoint port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default chat-completions endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default data directory.
const DEFAULT_DATA_DIR: &str = "./data";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} is required")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Telegram bot token.
    pub telegram_token: String,
    /// LLM API key.
    pub openai_api_key: String,
    /// Google credentials file.
    pub google_credentials: PathBuf,
    /// Google calendar ID.
    pub calendar_id: String,
    /// Health endpoint port.
    pub port: u16,
    /// Model name.
    pub openai_model: String,
    /// Chat-completions endpoint.
    pub openai_api_url: String,
    /// Directory holding the conversation log.
    pub data_dir: PathBuf,
    /// Retention period for interactions, in days.
    pub cleanup_days: Option<u32>,
}

impl Config {
    /// Loads and validates configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads and validates configuration using `lookup` to read variables.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get(PORT_ENV) {
            Some(value) => value.trim().parse::<u16>().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    var: PORT_ENV,
                    value,
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_PORT,
        };

        let cleanup_days = get(CLEANUP_DAYS_ENV)
            .map(|value| {
                value.trim().parse::<u32>().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid {
                        var: CLEANUP_DAYS_ENV,
                        value,
                        reason: e.to_string(),
                    }
                })
            })
            .transpose()?;

        let config = Self {
            telegram_token: get(TELEGRAM_TOKEN_ENV).unwrap_or_default(),
            openai_api_key: get(OPENAI_API_KEY_ENV).unwrap_or_default(),
            google_credentials: get(GOOGLE_CREDENTIALS_ENV)
                .map(PathBuf::from)
                .unwrap_or_default(),
            calendar_id: get(CALENDAR_ID_ENV).unwrap_or_default(),
            port,
            openai_model: get(OPENAI_MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_api_url: get(OPENAI_API_URL_ENV)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            data_dir: get(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            cleanup_days,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks that every required value is present.
    pub fn validate(&self) -> Result<()> {
        if self.telegram_token.is_empty() {
            return Err(ConfigError::Missing(TELEGRAM_TOKEN_ENV));
        }
        if self.openai_api_key.is_empty() {
            return Err(ConfigError::Missing(OPENAI_API_KEY_ENV));
        }
        if self.google_credentials.as_os_str().is_empty() {
            return Err(ConfigError::Missing(GOOGLE_CREDENTIALS_ENV));
        }
        if self.calendar_id.is_empty() {
            return Err(ConfigError::Missing(CALENDAR_ID_ENV));
        }
        Ok(())
    }

    /// Logs the configuration with secrets masked.
    pub fn log_summary(&self) {
        info!(
            telegram_token = %mask_token(&self.telegram_token),
            openai_api_key = %mask_token(&self.openai_api_key),
            google_credentials = %self.google_credentials.display(),
            calendar_id = %self.calendar_id,
            port = self.port,
            model = %self.openai_model,
            data_dir = %self.data_dir.display(),
            cleanup_days = ?self.cleanup_days,
            "Configuration loaded"
        );
    }
}

/// Data directory from the environment, without validating anything else.
///
/// Used by maintenance commands that only touch the conversation log.
pub fn data_dir_from_env() -> PathBuf {
    std::env::var(DATA_DIR_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Loads `.env` from the working directory, or the nearest parent that has
/// one, into the environment. Returns the file that was loaded.
///
/// Does not log; call it before installing the tracing subscriber.
pub fn load_env_file() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Loads the env file at `path`. Variables already set are kept.
pub fn load_env_file_from(path: &Path) -> Option<PathBuf> {
    dotenvy::from_path(path).ok().map(|()| path.to_path_buf())
}

/// Masks a secret for logging, keeping the first and last four characters.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
