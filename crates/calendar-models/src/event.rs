//! Calendar event type.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// An event as reported by the calendar.
///
/// Start and end keep the offset the calendar reported, so formatting them
/// shows the calendar's local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Calendar-assigned event ID.
    pub id: String,

    /// Event title (the calendar's "summary").
    pub title: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Start instant.
    pub start: DateTime<FixedOffset>,

    /// End instant.
    pub end: DateTime<FixedOffset>,

    /// Location, empty when unset.
    #[serde(default)]
    pub location: String,
}

impl CalendarEvent {
    /// Formats the event's time span as `HH:MM - HH:MM`.
    pub fn time_span(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}
