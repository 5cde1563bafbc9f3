//! Error types for the Telegram front end.

use thiserror::Error;

/// Errors that stop the bot from starting or running.
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] calendar_core::ConfigError),

    /// The conversation store could not be opened or written.
    #[error("Storage error: {0}")]
    Storage(#[from] calendar_persistence::PersistenceError),

    /// The calendar gateway could not be set up.
    #[error("Calendar error: {0}")]
    Calendar(#[from] calendar_google::CalendarError),

    /// The Telegram API rejected a startup call.
    #[error("Telegram error: {0}")]
    Telegram(String),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

impl From<teloxide::RequestError> for BotError {
    fn from(e: teloxide::RequestError) -> Self {
        BotError::Telegram(e.to_string())
    }
}
