//! Core data models for the calendar assistant.
//!
//! This crate provides the fundamental data types shared by every other
//! crate in the workspace: persisted interactions, classifier intents,
//! calendar events and date expressions.

pub mod date;
pub mod event;
pub mod intent;
pub mod interaction;

// Re-export main types
pub use date::{DateExpression, InvalidDateExpression};
pub use event::CalendarEvent;
pub use intent::{
    Action, BatchIntent, EventDetails, Intent, IntentPayload, SingleIntent, SubIntent,
    SubIntentPayload,
};
pub use interaction::Interaction;
