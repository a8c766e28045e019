//! Time handling for shuttle schedules.
//!
//! Departure times arrive from callers as ISO-8601 local date-times.
//! Schedules are expressed as time-of-day windows per weekday.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid time value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: String,
}

impl TimeError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Parse an ISO-8601 local date-time such as `2024-03-15T08:30:00`.
///
/// Seconds and fractional seconds are optional. Time zone offsets are
/// rejected: schedules are in campus local time.
///
/// # Examples
///
/// ```
/// use shuttle_server::domain::parse_departure_time;
///
/// let t = parse_departure_time("2024-03-15T08:30").unwrap();
/// assert_eq!(t.to_string(), "2024-03-15 08:30:00");
///
/// assert!(parse_departure_time("2024-03-15").is_err());
/// assert!(parse_departure_time("08:30").is_err());
/// ```
pub fn parse_departure_time(s: &str) -> Result<NaiveDateTime, TimeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TimeError::new("expected ISO-8601 date-time, got empty string"));
    }

    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Ok(dt);
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .map_err(|_| TimeError::new(format!("expected YYYY-MM-DDTHH:MM[:SS], got {s:?}")))
}

/// A time-of-day window, half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Create a window, rejecting windows that end before they start.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TimeError> {
        if end < start {
            return Err(TimeError::new("window end is before window start"));
        }
        Ok(Self { start, end })
    }

    /// Returns true if `t` falls inside the window.
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parse_full_precision() {
        let t = parse_departure_time("2024-03-15T08:30:15").unwrap();
        assert_eq!(t.to_string(), "2024-03-15 08:30:15");

        let t = parse_departure_time("2024-03-15T08:30:15.250").unwrap();
        assert_eq!(t.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn parse_without_seconds() {
        let t = parse_departure_time(" 2024-03-15T23:59 ").unwrap();
        assert_eq!(t.time(), hm(23, 59));
    }

    #[test]
    fn reject_malformed() {
        assert!(parse_departure_time("").is_err());
        assert!(parse_departure_time("tomorrow").is_err());
        assert!(parse_departure_time("2024-13-01T08:00").is_err());
        assert!(parse_departure_time("2024-03-15T25:00").is_err());
        assert!(parse_departure_time("2024-03-15T08:00:00+01:00").is_err());
    }

    #[test]
    fn error_message_mentions_input() {
        let err = parse_departure_time("soon").unwrap_err();
        assert!(err.to_string().contains("\"soon\""));
    }

    #[test]
    fn window_is_half_open() {
        let w = TimeWindow::new(hm(7, 0), hm(9, 0)).unwrap();
        assert!(w.contains(hm(7, 0)));
        assert!(w.contains(hm(8, 59)));
        assert!(!w.contains(hm(9, 0)));
        assert!(!w.contains(hm(6, 59)));
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(TimeWindow::new(hm(9, 0), hm(7, 0)).is_err());
        assert!(TimeWindow::new(hm(9, 0), hm(9, 0)).is_ok());
    }
}
