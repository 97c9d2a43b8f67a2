use chrono::{NaiveDate, NaiveTime};
use log::{debug, trace};

use crate::{CalError, MonthCursor, Result};

/// Format used for the human-readable day label, e.g. `5 March 2024`.
const DAY_LABEL_FORMAT: &str = "%-d %B %Y";

/// Parses an `HH:MM` time as entered in the event form.
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        debug!("Rejecting time value '{}'", value);
        CalError::InvalidTime {
            value: value.to_string(),
        }
    })
}

/// Formats a time back into the `HH:MM` form used for storage and display.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Builds the display label for a day, e.g. `5 March 2024`.
pub fn format_day_label(date: NaiveDate) -> String {
    date.format(DAY_LABEL_FORMAT).to_string()
}

/// Parses a stored day, accepting ISO dates as well as legacy labels
/// such as `5 March 2024`.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    match NaiveDate::parse_from_str(value, "%d %B %Y") {
        Ok(date) => {
            trace!("Parsed legacy day label '{}'", value);
            Some(date)
        }
        Err(_) => None,
    }
}

/// Parses a `YYYY-MM-DD` date argument.
pub fn parse_date_arg(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| CalError::InvalidFormat {
        message: format!("Invalid date '{}'. Expected YYYY-MM-DD", value),
    })
}

/// Parses a `YYYY-MM` month argument into a cursor.
pub fn parse_month_arg(value: &str) -> Result<MonthCursor> {
    let invalid = || CalError::InvalidFormat {
        message: format!("Invalid month '{}'. Expected YYYY-MM", value),
    };

    let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    MonthCursor::new(year, month).ok_or_else(invalid)
}

/// Key used for the (name, day) uniqueness check.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time(" 23:05 ").unwrap(),
            NaiveTime::from_hms_opt(23, 5, 0).unwrap()
        );
        assert!(matches!(
            parse_time("25:00"),
            Err(CalError::InvalidTime { .. })
        ));
        assert!(parse_time("noon").is_err());
    }

    #[test]
    fn test_day_label_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let label = format_day_label(date);
        assert_eq!(label, "5 March 2024");
        assert_eq!(parse_day(&label), Some(date));
    }

    #[test]
    fn test_parse_day_accepts_iso() {
        assert_eq!(
            parse_day("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }

    #[test]
    fn test_parse_day_rejects_garbage() {
        assert_eq!(parse_day("sometime next week"), None);
        assert_eq!(parse_day("31 February 2024"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn test_parse_month_arg() {
        let cursor = parse_month_arg("2024-02").unwrap();
        assert_eq!((cursor.year(), cursor.month()), (2024, 2));
        assert!(parse_month_arg("2024-13").is_err());
        assert!(parse_month_arg("2024").is_err());
        assert!(parse_month_arg("feb-2024").is_err());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Team Standup "), "team standup");
    }
}
