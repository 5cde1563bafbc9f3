//! Outbound delivery of responses.

use async_trait::async_trait;
use thiserror::Error;

/// A response could not be delivered to the chat.
#[derive(Debug, Error)]
#[error("failed to deliver message to chat {chat_id}: {reason}")]
pub struct TransportError {
    /// Destination chat.
    pub chat_id: i64,
    /// Transport-specific cause.
    pub reason: String,
}

impl TransportError {
    /// Creates an error for `chat_id`.
    pub fn new(chat_id: i64, reason: impl Into<String>) -> Self {
        Self {
            chat_id,
            reason: reason.into(),
        }
    }
}

/// Delivers response text to a chat.
///
/// Implementations split text that exceeds the transport's message limit.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Sends `text` to `chat_id`.
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;
}
