//! Day-key parsing and display formatting.
//!
//! Day-keys use the feed's "Month-Day-Year" form ("April-11-2025"). Month names
//! may be full or abbreviated and are matched case-insensitively.

use chrono::NaiveDate;

use crate::{Error, Result};

/// Parse a "Month-Day-Year" day-key into a calendar date.
pub fn parse_date(day_key: &str) -> Result<NaiveDate> {
    let mut parts = day_key.trim().split('-');
    let (Some(month), Some(day), Some(year)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::InvalidDayKey(day_key.to_string()));
    };
    if parts.next().is_some() || month.is_empty() || day.is_empty() || year.is_empty() {
        return Err(Error::InvalidDayKey(day_key.to_string()));
    }

    NaiveDate::parse_from_str(&format!("{} {} {}", month, day, year), "%B %d %Y")
        .map_err(|_| Error::InvalidDayKey(day_key.to_string()))
}

/// Short month and day, e.g. "Apr 11".
pub fn format_date(day_key: &str) -> Result<String> {
    Ok(parse_date(day_key)?.format("%b %-d").to_string())
}

/// Full weekday name, e.g. "Friday".
pub fn day_of_week(day_key: &str) -> Result<String> {
    Ok(parse_date(day_key)?.format("%A").to_string())
}

/// Convert "H:MM" (24-hour) to "h:MM AM/PM".
///
/// Minutes are copied verbatim, defaulting to "00" when the input has no
/// colon. The hour is not range-checked, and an hour that does not parse is
/// treated as midnight.
pub fn format_time(time: &str) -> String {
    let (hours, minutes) = time.split_once(':').unwrap_or((time, "00"));
    let hour: i64 = hours.trim().parse().unwrap_or(0);
    let ampm = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{} {}", hour12, minutes, ampm)
}
