//! Date expressions accepted by the calendar gateway.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

/// Wire format of an explicit calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A date literal that is neither a keyword nor an ISO date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date expression '{0}': expected today, tomorrow, yesterday or YYYY-MM-DD")]
pub struct InvalidDateExpression(pub String);

/// A day the user asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateExpression {
    /// The current UTC day.
    Today,
    /// The UTC day after today.
    Tomorrow,
    /// The UTC day before today.
    Yesterday,
    /// An explicit calendar date.
    Date(NaiveDate),
}

impl DateExpression {
    /// Resolves the expression to a concrete date relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Today => today,
            Self::Tomorrow => today.checked_add_days(Days::new(1)).unwrap_or(today),
            Self::Yesterday => today.checked_sub_days(Days::new(1)).unwrap_or(today),
            Self::Date(date) => *date,
        }
    }

    /// Returns the `[start, end)` UTC bounds of the resolved day.
    pub fn day_bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let day = self.resolve(now.date_naive());
        let start = day.and_time(NaiveTime::default()).and_utc();
        (start, start + chrono::Duration::days(1))
    }
}

impl FromStr for DateExpression {
    type Err = InvalidDateExpression;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "yesterday" => Ok(Self::Yesterday),
            other => NaiveDate::parse_from_str(other, DATE_FORMAT)
                .map(Self::Date)
                .map_err(|_| InvalidDateExpression(s.to_string())),
        }
    }
}

impl fmt::Display for DateExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => write!(f, "today"),
            Self::Tomorrow => write!(f, "tomorrow"),
            Self::Yesterday => write!(f, "yesterday"),
            Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
        }
    }
}
