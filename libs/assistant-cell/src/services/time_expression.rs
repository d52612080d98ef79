//! Best-effort extraction of "weekday + time of day" from patient messages.
//!
//! The grammar is deliberately narrow: a full weekday name, optional
//! separators and `at`, a 1-2 digit hour, an optional `:mm` / `.mm` minute
//! and an optional `am` / `pm`. With a meridian the hour is read on a 12-hour
//! clock, without one on a 24-hour clock. Times are store-local.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

use doctor_cell::Weekday;

use crate::error::TimeParseError;

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(monday|tuesday|wednesday|thursday|friday|saturday|sunday)[\s,:-]*(?:at\s*)?([0-9]{1,2})(?:[:.]([0-9]{2}))?\s*(am|pm)?",
    )
    .expect("time expression pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeExpression {
    pub day: Weekday,
    pub time: NaiveTime,
}

impl TimeExpression {
    /// Canonical `"HH:MM"` form used as the slot value in schedules.
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

impl fmt::Display for TimeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.time_label())
    }
}

/// Whether the text contains something shaped like a weekday and an hour.
pub fn matches_time_expression(text: &str) -> bool {
    TIME_PATTERN.is_match(text)
}

pub fn parse_time_expression(text: &str) -> Result<TimeExpression, TimeParseError> {
    let captures = TIME_PATTERN.captures(text).ok_or(TimeParseError::NoMatch)?;

    let day: Weekday = captures[1].parse().map_err(|_| TimeParseError::NoMatch)?;
    let hour: u32 = captures[2].parse().map_err(|_| TimeParseError::NoMatch)?;
    let minute: u32 = match captures.get(3) {
        Some(m) => m.as_str().parse().map_err(|_| TimeParseError::NoMatch)?,
        None => 0,
    };
    let meridian = captures
        .get(4)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default();

    let invalid = || TimeParseError::InvalidTime { hour, minute, meridian: meridian.clone() };

    let hour_24 = match meridian.as_str() {
        "" => hour,
        _ if !(1..=12).contains(&hour) => return Err(invalid()),
        "am" => hour % 12,
        _ => hour % 12 + 12,
    };

    let time = NaiveTime::from_hms_opt(hour_24, minute, 0).ok_or_else(invalid)?;

    Ok(TimeExpression { day, time })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pair(text: &str) -> (String, String) {
        let expression = parse_time_expression(text).unwrap();
        (expression.day.to_string(), expression.time_label())
    }

    fn expect(day: &str, time: &str) -> (String, String) {
        (day.to_string(), time.to_string())
    }

    #[test]
    fn meridian_means_twelve_hour_clock() {
        assert_eq!(pair("monday at 10am"), expect("Monday", "10:00"));
        assert_eq!(pair("Tuesday 3pm"), expect("Tuesday", "15:00"));
        assert_eq!(pair("friday at 4:30 PM"), expect("Friday", "16:30"));
        assert_eq!(pair("sunday 12am"), expect("Sunday", "00:00"));
        assert_eq!(pair("sunday 12pm"), expect("Sunday", "12:00"));
    }

    #[test]
    fn no_meridian_means_twenty_four_hour_clock() {
        assert_eq!(pair("monday 14:30"), expect("Monday", "14:30"));
        assert_eq!(pair("monday at 10:00"), expect("Monday", "10:00"));
        assert_eq!(pair("Wednesday, 9"), expect("Wednesday", "09:00"));
        assert_eq!(pair("thursday-0"), expect("Thursday", "00:00"));
    }

    #[test]
    fn dot_separates_minutes_too() {
        assert_eq!(pair("saturday 9.15am"), expect("Saturday", "09:15"));
        assert_eq!(pair("saturday 21.45"), expect("Saturday", "21:45"));
    }

    #[test]
    fn finds_expression_inside_a_sentence() {
        assert_eq!(pair("Can I book MONDAY at 11am please?"), expect("Monday", "11:00"));
    }

    #[test]
    fn unknown_day_does_not_match() {
        assert!(!matches_time_expression("funday 10am"));
        assert_matches!(parse_time_expression("funday 10am"), Err(TimeParseError::NoMatch));
        assert_matches!(parse_time_expression("mon 10am"), Err(TimeParseError::NoMatch));
        assert_matches!(parse_time_expression("monday morning"), Err(TimeParseError::NoMatch));
    }

    #[test]
    fn out_of_range_hours_are_rejected() {
        assert!(matches_time_expression("monday 25:00"));
        assert_matches!(parse_time_expression("monday 25:00"), Err(TimeParseError::InvalidTime { hour: 25, .. }));
        assert_matches!(parse_time_expression("monday 13pm"), Err(TimeParseError::InvalidTime { hour: 13, .. }));
        assert_matches!(parse_time_expression("monday 0am"), Err(TimeParseError::InvalidTime { hour: 0, .. }));
        assert_matches!(parse_time_expression("monday 10:75"), Err(TimeParseError::InvalidTime { minute: 75, .. }));
    }

    #[test]
    fn display_is_day_then_time() {
        assert_eq!(parse_time_expression("monday 9am").unwrap().to_string(), "Monday 09:00");
    }
}
