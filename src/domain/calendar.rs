//! Trading-day calendar helpers.
//!
//! Business days are Monday through Friday; no holiday calendar.

use crate::domain::error::EqindexError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date string, failing with [`EqindexError::InvalidDate`]
/// on anything malformed.
pub fn parse_date(input: &str) -> Result<NaiveDate, EqindexError> {
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| EqindexError::InvalidDate {
        input: input.to_string(),
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All business days in [start, end] inclusive, ascending. Empty when
/// start > end.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        if is_business_day(current) {
            days.push(current);
        }
        current += Duration::days(1);
    }
    days
}
