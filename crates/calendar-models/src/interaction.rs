//! Persisted conversation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single exchange between a user and the assistant.
///
/// Interactions are immutable once created; the conversation store owns
/// them and only ever appends or evicts whole records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Telegram user ID.
    pub user_id: i64,

    /// When the interaction was recorded.
    pub timestamp: DateTime<Utc>,

    /// What the user wrote.
    pub user_message: String,

    /// The message the classifier produced for the user.
    pub ai_response: String,

    /// Action tag chosen by the classifier (e.g. "getEvents").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,
}

impl Interaction {
    /// Creates a new interaction stamped with the current time.
    pub fn new(
        user_id: i64,
        user_message: impl Into<String>,
        ai_response: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            timestamp: Utc::now(),
            user_message: user_message.into(),
            ai_response: ai_response.into(),
            action: action.into(),
        }
    }

    /// Overrides the timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
