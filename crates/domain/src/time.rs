//! Time helpers shared by the status report and the polling controllers.

use chrono::{DateTime, Local, NaiveTime, Timelike};

/// Local wall-clock timestamp stamped on events and status reports.
pub type Timestamp = DateTime<Local>;

/// Return the current local time.
#[must_use]
pub fn now() -> Timestamp {
    Local::now()
}

/// Parse an `HH:MM` time of day.
///
/// # Errors
///
/// Returns the chrono parse error when `text` is not a valid 24-hour `HH:MM`.
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
}

/// Whether two times fall on the same minute of the day.
#[must_use]
pub fn same_minute(a: NaiveTime, b: NaiveTime) -> bool {
    a.hour() == b.hour() && a.minute() == b.minute()
}
