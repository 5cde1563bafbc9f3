//! Message orchestration for the calendar assistant.
//!
//! [`Orchestrator`] takes a raw chat message through
//! context lookup → classification → persistence → action dispatch →
//! delivery. Every collaborator sits behind a trait
//! ([`IntentClassifier`](calendar_agent::IntentClassifier),
//! [`CalendarGateway`](calendar_google::CalendarGateway),
//! [`NotificationSink`]) so the transport and the external APIs can be
//! swapped out in tests.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use calendar_orchestrator::Orchestrator;
//!
//! let orchestrator = Orchestrator::new(store, classifier, calendar, sink);
//! orchestrator.handle_message(user_id, chat_id, "what's on tomorrow?").await?;
//! ```

mod orchestrator;
pub mod render;
mod sink;

pub use orchestrator::{
    Orchestrator, CALLBACK_TODAY, CALLBACK_TOMORROW, CLASSIFICATION_FAILED_REPLY, CONTEXT_WINDOW,
};
pub use sink::{NotificationSink, TransportError};
