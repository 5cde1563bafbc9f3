//! Google Calendar access for the calendar assistant.
//!
//! The [`CalendarGateway`] trait is what the rest of the workspace depends
//! on; [`GoogleCalendar`] implements it over the Calendar v3 REST API using
//! credentials loaded by [`Credentials`].

pub mod auth;
pub mod error;
pub mod gateway;
pub mod google;

pub use auth::{Credentials, TokenProvider, CALENDAR_SCOPE};
pub use error::{CalendarError, Result};
pub use gateway::CalendarGateway;
pub use google::{GoogleCalendar, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
