//! Database query operations, one module per persisted collection.

pub mod distributions;
pub mod episodes;
pub mod steps;

use chrono::{DateTime, Utc};

/// Parse a stored RFC 3339 timestamp, falling back to now on corruption.
pub(crate) fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse an optional stored RFC 3339 timestamp.
pub(crate) fn parse_opt_ts(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
