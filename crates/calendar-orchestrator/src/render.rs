//! Response text for event listings.
//!
//! Three layouts exist: a single-day answer, one block per step of a batch,
//! and the quick-view buttons. They differ in how many events are shown and
//! in how truncation is announced.

use std::fmt::Write;

use calendar_google::CalendarError;
use calendar_models::CalendarEvent;

/// Events shown for a single `getEvents` request.
pub const MAX_EVENTS_SINGLE: usize = 20;

/// Events shown per day inside a batch.
pub const MAX_EVENTS_BATCH: usize = 15;

/// Events shown for a quick-view button.
pub const MAX_EVENTS_QUICK_VIEW: usize = 15;

/// Formats one event as `• {title} (HH:MM - HH:MM)[ - {location}]\n`.
pub fn event_line(event: &CalendarEvent) -> String {
    let mut line = format!("• {} ({})", event.title, event.time_span());
    if !event.location.is_empty() {
        let _ = write!(line, " - {}", event.location);
    }
    line.push('\n');
    line
}

fn push_lines(out: &mut String, events: &[CalendarEvent], max: usize) {
    for event in events.iter().take(max) {
        out.push_str(&event_line(event));
    }
}

/// Response to a single-day listing.
pub fn day_listing(date: &str, result: &Result<Vec<CalendarEvent>, CalendarError>) -> String {
    let events = match result {
        Err(e) => return format!("Error getting events: {e}"),
        Ok(events) if events.is_empty() => return format!("No events found for {date}."),
        Ok(events) => events,
    };

    let total = events.len();
    let mut out = if total > MAX_EVENTS_SINGLE {
        format!("Events for {date} (showing first {MAX_EVENTS_SINGLE} of {total}):\n")
    } else {
        format!("Events for {date}:\n")
    };
    push_lines(&mut out, events, MAX_EVENTS_SINGLE);

    if total > MAX_EVENTS_SINGLE {
        let _ = write!(
            out,
            "\n... and {} more events. Use a more specific date range to see fewer events.",
            total - MAX_EVENTS_SINGLE
        );
    }
    out
}

/// One day's block inside a batch response.
pub fn batch_block(date: &str, result: &Result<Vec<CalendarEvent>, CalendarError>) -> String {
    let events = match result {
        Err(e) => return format!("Error getting events for {date}: {e}\n"),
        Ok(events) if events.is_empty() => return format!("No events found for {date}.\n"),
        Ok(events) => events,
    };

    let total = events.len();
    let mut out = if total > MAX_EVENTS_BATCH {
        format!("Events for {date} (showing first {MAX_EVENTS_BATCH} of {total}):\n")
    } else {
        format!("Events for {date}:\n")
    };
    push_lines(&mut out, events, MAX_EVENTS_BATCH);

    if total > MAX_EVENTS_BATCH {
        let _ = writeln!(out, "... and {} more events.", total - MAX_EVENTS_BATCH);
    }
    out.push('\n');
    out
}

/// Response to a quick-view button for `day` ("today" or "tomorrow").
pub fn quick_view(day: &str, result: &Result<Vec<CalendarEvent>, CalendarError>) -> String {
    let events = match result {
        Err(e) => return format!("Error getting events: {e}"),
        Ok(events) if events.is_empty() => return format!("No events found for {day}."),
        Ok(events) => events,
    };

    let total = events.len();
    let mut out = format!("Here are your events for {day}:");
    if total > MAX_EVENTS_QUICK_VIEW {
        let _ = writeln!(out, "\n(showing first {MAX_EVENTS_QUICK_VIEW} of {total}):");
    } else {
        out.push('\n');
    }
    push_lines(&mut out, events, MAX_EVENTS_QUICK_VIEW);

    if total > MAX_EVENTS_QUICK_VIEW {
        let _ = write!(out, "... and {} more events.", total - MAX_EVENTS_QUICK_VIEW);
    }
    out
}
