//! The calendar seam used by the orchestrator.

use async_trait::async_trait;
use calendar_models::{CalendarEvent, EventDetails};

use crate::error::Result;

/// Calendar operations keyed by date expressions and event IDs.
///
/// Dates are `today`, `tomorrow`, `yesterday` or `YYYY-MM-DD`; times are
/// `HH:MM`. Anything else fails with
/// [`CalendarError::InvalidDateFormat`](crate::CalendarError::InvalidDateFormat).
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Lists the events of one day, ordered by start time.
    async fn get_events(&self, date: &str) -> Result<Vec<CalendarEvent>>;

    /// Creates a one-hour event from `details`.
    async fn create_event(&self, details: &EventDetails) -> Result<()>;

    /// Replaces the event `event_id` with `details`.
    async fn update_event(&self, event_id: &str, details: &EventDetails) -> Result<()>;

    /// Deletes the event `event_id`.
    async fn delete_event(&self, event_id: &str) -> Result<()>;
}
