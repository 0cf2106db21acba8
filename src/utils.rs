use crate::error::{LedgerError, Result};
use chrono::{Datelike, Days, NaiveDate};

pub fn first_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    // December never needs the following year, which may not exist
    if month == 12 {
        return last_day_of_year(year);
    }

    NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()
}

pub fn first_day_of_year(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

pub fn last_day_of_year(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
}

/// Returns the Monday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> Option<NaiveDate> {
    let offset = date.weekday().num_days_from_monday();
    date.checked_sub_days(Days::new(u64::from(offset)))
}

pub fn end_of_week(date: NaiveDate) -> Option<NaiveDate> {
    start_of_week(date)?.checked_add_days(Days::new(6))
}

/// Parses a calendar date in the format "YYYY-MM-DD"
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::DateError(format!(
            "Invalid date format: {}. Expected YYYY-MM-DD",
            text
        ))
    })
}

pub(crate) fn out_of_range(what: &str, date: NaiveDate) -> LedgerError {
    LedgerError::DateError(format!(
        "{} for {} is outside the supported calendar",
        what, date
    ))
}
