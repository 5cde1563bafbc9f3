//! Error types for calendar operations.

use thiserror::Error;

/// Errors that can occur while talking to the calendar.
///
/// The orchestrator renders these inline ("Error getting events: ...");
/// none of them aborts the conversation.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// A date or time could not be parsed.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),

    /// The credentials file is missing or malformed.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// Obtaining an access token failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The HTTP request could not be completed.
    #[error("request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("Google API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The API response could not be parsed.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Result type for calendar operations.
pub type Result<T> = std::result::Result<T, CalendarError>;

impl From<reqwest::Error> for CalendarError {
    fn from(e: reqwest::Error) -> Self {
        CalendarError::Request(e.to_string())
    }
}

impl From<calendar_models::InvalidDateExpression> for CalendarError {
    fn from(e: calendar_models::InvalidDateExpression) -> Self {
        CalendarError::InvalidDateFormat(e.to_string())
    }
}
