//! Classifier intents.
//!
//! The language model answers with a flat JSON object ([`IntentPayload`]).
//! It is converted once into the tagged [`Intent`] so the dispatcher never
//! has to check "is there an actions list?" ad hoc: a non-empty `actions`
//! list always wins over the single `action` field.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A calendar action the classifier can request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// List events for a day (`getEvents`).
    GetEvents,
    /// Create an event (`makeEvent`).
    MakeEvent,
    /// Update an existing event by ID (`updtEvent`).
    UpdateEvent,
    /// Delete an existing event by ID (`delEvents`).
    DeleteEvent,
    /// Plain conversational reply (`message`).
    Message,
    /// Nothing to do (`None`).
    None,
    /// Any tag the dispatcher does not know, kept verbatim.
    Other(String),
}

impl Action {
    /// Parses a wire tag. Unknown tags become [`Action::Other`].
    pub fn parse(tag: &str) -> Self {
        match tag {
            "getEvents" => Self::GetEvents,
            "makeEvent" => Self::MakeEvent,
            "updtEvent" | "updateEvent" => Self::UpdateEvent,
            "delEvents" | "deleteEvent" => Self::DeleteEvent,
            "message" => Self::Message,
            "None" => Self::None,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the canonical wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::GetEvents => "getEvents",
            Self::MakeEvent => "makeEvent",
            Self::UpdateEvent => "updtEvent",
            Self::DeleteEvent => "delEvents",
            Self::Message => "message",
            Self::None => "None",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event fields shared by single intents and batch steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Event title.
    #[serde(rename = "event_title", default, deserialize_with = "null_as_empty")]
    pub title: String,

    /// Date expression (today/tomorrow/yesterday/YYYY-MM-DD).
    #[serde(rename = "event_date", default, deserialize_with = "null_as_empty")]
    pub date: String,

    /// Start time as `HH:MM`.
    #[serde(rename = "event_time", default, deserialize_with = "null_as_empty")]
    pub time: String,

    /// Event description.
    #[serde(rename = "event_description", default, deserialize_with = "null_as_empty")]
    pub description: String,

    /// Event location.
    #[serde(rename = "event_location", default, deserialize_with = "null_as_empty")]
    pub location: String,
}

/// One step of a multi-action request, as sent by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubIntentPayload {
    /// Action tag.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub action: String,

    /// Event fields.
    #[serde(flatten)]
    pub details: EventDetails,
}

/// The raw JSON object the model answers with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentPayload {
    /// Action tag for single-step requests.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub action: String,

    /// Text shown to the user.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,

    /// Target event for update/delete.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_id: String,

    /// Event fields.
    #[serde(flatten)]
    pub details: EventDetails,

    /// Ordered steps for multi-action requests.
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<SubIntentPayload>,
}

/// A single-action intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleIntent {
    /// Requested action.
    pub action: Action,
    /// Text shown to the user.
    pub message: String,
    /// Target event for update/delete, empty when not given.
    pub event_id: String,
    /// Event fields.
    pub details: EventDetails,
}

/// One step of a batch intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubIntent {
    /// Requested action.
    pub action: Action,
    /// Event fields.
    pub details: EventDetails,
}

/// A multi-action intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchIntent {
    /// Top-level action tag as sent (usually empty), kept for the log.
    pub tag: String,
    /// Text prefixed to the combined response.
    pub message: String,
    /// Steps in the order the model listed them.
    pub steps: Vec<SubIntent>,
}

/// The classifier's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// One action.
    Single(SingleIntent),
    /// An ordered list of actions under one message.
    Batch(BatchIntent),
}

impl Intent {
    /// A plain reply with no calendar side effect.
    pub fn reply(message: impl Into<String>) -> Self {
        Self::Single(SingleIntent {
            action: Action::Message,
            message: message.into(),
            event_id: String::new(),
            details: EventDetails::default(),
        })
    }

    /// Text the classifier wants shown to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Single(single) => &single.message,
            Self::Batch(batch) => &batch.message,
        }
    }

    /// Action tag recorded in the conversation log.
    pub fn action_tag(&self) -> &str {
        match self {
            Self::Single(single) => single.action.as_str(),
            Self::Batch(batch) => &batch.tag,
        }
    }
}

impl From<SubIntentPayload> for SubIntent {
    fn from(payload: SubIntentPayload) -> Self {
        Self {
            action: Action::parse(&payload.action),
            details: payload.details,
        }
    }
}

impl From<IntentPayload> for Intent {
    fn from(payload: IntentPayload) -> Self {
        if payload.actions.is_empty() {
            Self::Single(SingleIntent {
                action: Action::parse(&payload.action),
                message: payload.message,
                event_id: payload.event_id,
                details: payload.details,
            })
        } else {
            Self::Batch(BatchIntent {
                tag: payload.action,
                message: payload.message,
                steps: payload.actions.into_iter().map(SubIntent::from).collect(),
            })
        }
    }
}

/// Models sometimes send `null` where a string is expected.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
