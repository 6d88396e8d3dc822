use chrono::{DateTime, NaiveDate};

use crate::errors::{Error, Result};

/// Parse a date parameter as either a plain `YYYY-MM-DD` day or a full
/// RFC 3339 datetime. Time-of-day is discarded; entries are keyed by
/// calendar day.
pub fn parse_date_param(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(datetime.date_naive());
    }
    Err(Error::validation(format!(
        "invalid date {trimmed:?}: expected YYYY-MM-DD or an ISO 8601 datetime"
    )))
}
