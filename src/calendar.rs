//! Month grid arithmetic.
//!
//! Computes the cells of a month view: blank padding for the weekdays before
//! the 1st, followed by one cell per day of the month.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sunday-first header row for the month view.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// A single position in the month view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridCell {
    /// Padding before the first day of the month
    Empty,
    /// A day of the month, starting at 1
    Day(u32),
}

impl GridCell {
    pub fn day(&self) -> Option<u32> {
        match self {
            GridCell::Empty => None,
            GridCell::Day(day) => Some(*day),
        }
    }
}

/// Number of days in the given month (1-based).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date,
        None => return 0,
    };

    // The day before the first of next month is the last day of this one.
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Weekday of the 1st of the month, 0 = Sunday through 6 = Saturday.
pub fn start_weekday(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

/// Generates the cells for a month: leading padding, then days 1..=N.
/// There is no trailing padding.
pub fn generate_grid(year: i32, month: u32) -> Vec<GridCell> {
    let padding = start_weekday(year, month);
    let days = days_in_month(year, month);

    let mut cells = Vec::with_capacity((padding + days) as usize);
    cells.extend((0..padding).map(|_| GridCell::Empty));
    cells.extend((1..=days).map(GridCell::Day));
    cells
}

/// The month currently displayed.
///
/// Only year and month are kept, so moving between months can never
/// overflow the day of month (Jan 31 back one month is December, not March).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    /// Creates a cursor, returning `None` for a month outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn grid(&self) -> Vec<GridCell> {
        generate_grid(self.year, self.month)
    }

    /// The date of `day` within this month, if that day exists.
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Whether `day` of this month is `today`.
    pub fn is_today(&self, day: u32, today: NaiveDate) -> bool {
        today.day() == day && self.contains(today)
    }

    /// Heading label, e.g. `March 2024`.
    pub fn label(&self) -> String {
        match self.date(1) {
            Some(first) => first.format("%B %Y").to_string(),
            None => format!("{}-{:02}", self.year, self.month),
        }
    }
}
