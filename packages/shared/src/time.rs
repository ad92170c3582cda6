//! Wall-clock timestamp helpers.

use chrono::{DateTime, Utc};

/// Get current Unix timestamp in UTC (milliseconds)
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a Unix millisecond timestamp as an RFC 3339 string (UTC).
///
/// Out-of-range values fall back to the Unix epoch rather than panicking.
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    let datetime = DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    datetime.to_rfc3339()
}
