//! Error types for intent classification.

use thiserror::Error;

/// Errors that can occur while classifying a message.
///
/// Every variant is terminal for the message being handled; the user is
/// asked to try again.
#[derive(Error, Debug)]
pub enum ClassificationError {
    /// The HTTP request could not be completed.
    #[error("model request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("model API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The API response envelope could not be parsed.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// The API returned no choices.
    #[error("no response from model")]
    EmptyResponse,
}

/// Result type for classification operations.
pub type Result<T> = std::result::Result<T, ClassificationError>;
