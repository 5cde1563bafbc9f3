//! Google Calendar v3 REST gateway.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use calendar_models::date::DATE_FORMAT;
use calendar_models::{CalendarEvent, DateExpression, EventDetails};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{Credentials, TokenProvider};
use crate::error::{CalendarError, Result};
use crate::gateway::CalendarGateway;

/// Calendar API root.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Per-request timeout for calendar calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Length of created events, in hours.
const DEFAULT_EVENT_HOURS: i64 = 1;

const TIME_FORMAT: &str = "%H:%M";

/// Calendar gateway backed by the Google Calendar API.
pub struct GoogleCalendar {
    http: Client,
    tokens: TokenProvider,
    calendar_id: String,
    base_url: Url,
}

impl GoogleCalendar {
    /// Creates a gateway for `calendar_id` authenticated by `tokens`.
    pub fn new(tokens: TokenProvider, calendar_id: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CalendarError::Request(e.to_string()))?;
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|e| CalendarError::Request(format!("invalid base URL: {e}")))?;

        Ok(Self {
            http,
            tokens,
            calendar_id: calendar_id.into(),
            base_url,
        })
    }

    /// Creates a gateway from a Google credentials file.
    pub fn from_credentials_file(path: &Path, calendar_id: impl Into<String>) -> Result<Self> {
        let credentials = Credentials::from_file(path)?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CalendarError::Request(e.to_string()))?;
        Self::new(TokenProvider::new(credentials, http), calendar_id)
    }

    /// Points the gateway at another API root.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)
            .map_err(|e| CalendarError::Request(format!("invalid base URL '{base_url}': {e}")))?;
        Ok(self)
    }

    /// Calendar this gateway operates on.
    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Lists today's events and logs the outcome. Never fails.
    pub async fn test_connection(&self) -> bool {
        info!(calendar_id = %self.calendar_id, "Testing Google Calendar connection");
        match self.get_events("today").await {
            Ok(events) => {
                info!(count = events.len(), "Google Calendar connection test successful");
                true
            }
            Err(e) => {
                warn!(error = %e, "Google Calendar connection test failed");
                false
            }
        }
    }

    fn events_url(&self, event_id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CalendarError::Request(format!("base URL cannot be a base: {}", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }
}

#[async_trait]
impl CalendarGateway for GoogleCalendar {
    async fn get_events(&self, date: &str) -> Result<Vec<CalendarEvent>> {
        let date = if date.trim().is_empty() { "today" } else { date };
        let expr: DateExpression = date.parse()?;
        let (start, end) = expr.day_bounds(Utc::now());

        let request = self.request(Method::GET, self.events_url(None)?).await?;
        let response = request
            .query(&[
                ("timeMin", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("timeMax", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("orderBy", "startTime".to_string()),
                ("singleEvents", "true".to_string()),
            ])
            .send()
            .await?;

        let listing: GoogleEventsResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::Parse(e.to_string()))?;

        let events: Vec<CalendarEvent> =
            listing.items.into_iter().filter_map(GoogleEvent::into_event).collect();
        debug!(date = %expr, count = events.len(), "Listed events");
        Ok(events)
    }

    async fn create_event(&self, details: &EventDetails) -> Result<()> {
        let body = EventBody::from_details(details, Utc::now().date_naive())?;
        let request = self.request(Method::POST, self.events_url(None)?).await?;
        check_status(request.json(&body).send().await?).await?;
        info!(title = %details.title, start = %body.start.date_time, "Created event");
        Ok(())
    }

    async fn update_event(&self, event_id: &str, details: &EventDetails) -> Result<()> {
        let body = EventBody::from_details(details, Utc::now().date_naive())?;
        let request = self.request(Method::PUT, self.events_url(Some(event_id))?).await?;
        check_status(request.json(&body).send().await?).await?;
        info!(event_id = %event_id, "Updated event");
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, self.events_url(Some(event_id))?)
            .await?;
        check_status(request.send().await?).await?;
        info!(event_id = %event_id, "Deleted event");
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(CalendarError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Resolves a date expression and `HH:MM` time to a UTC start instant.
fn start_instant(date: &str, time: &str, today: NaiveDate) -> Result<DateTime<Utc>> {
    let day = date.parse::<DateExpression>()?.resolve(today);
    let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).map_err(|e| {
        CalendarError::InvalidDateFormat(format!("invalid time '{time}': expected HH:MM ({e})"))
    })?;
    Ok(NaiveDateTime::new(day, time).and_utc())
}

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
struct GoogleEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    start: GoogleEventTime,
    end: GoogleEventTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl GoogleEventTime {
    /// Timed events carry `dateTime`; all-day events only `date`, taken as
    /// midnight UTC.
    fn instant(&self) -> Option<DateTime<FixedOffset>> {
        if let Some(date_time) = &self.date_time {
            return DateTime::parse_from_rfc3339(date_time).ok();
        }
        let date = NaiveDate::parse_from_str(self.date.as_deref()?, DATE_FORMAT).ok()?;
        Some(date.and_time(NaiveTime::default()).and_utc().fixed_offset())
    }
}

impl GoogleEvent {
    fn into_event(self) -> Option<CalendarEvent> {
        let (Some(start), Some(end)) = (self.start.instant(), self.end.instant()) else {
            warn!(event_id = %self.id, "Skipping event without a usable start/end");
            return None;
        };
        Some(CalendarEvent {
            id: self.id,
            title: self.summary.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            start,
            end,
            location: self.location.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize)]
struct EventBody {
    summary: String,
    description: String,
    location: String,
    start: EventBodyTime,
    end: EventBodyTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventBodyTime {
    date_time: String,
    time_zone: &'static str,
}

impl EventBodyTime {
    fn utc(instant: DateTime<Utc>) -> Self {
        Self {
            date_time: instant.to_rfc3339_opts(SecondsFormat::Secs, true),
            time_zone: "UTC",
        }
    }
}

impl EventBody {
    fn from_details(details: &EventDetails, today: NaiveDate) -> Result<Self> {
        let start = start_instant(&details.date, &details.time, today)?;
        Ok(Self {
            summary: details.title.clone(),
            description: details.description.clone(),
            location: details.location.clone(),
            start: EventBodyTime::utc(start),
            end: EventBodyTime::utc(start + chrono::Duration::hours(DEFAULT_EVENT_HOURS)),
        })
    }
}
