use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| AppError::InvalidDate(s.to_string()))
}

/// Parse an optional date argument, defaulting to `today`.
pub fn parse_date_or(s: Option<&str>, today: NaiveDate) -> AppResult<NaiveDate> {
    match s {
        Some(s) => parse_date(s),
        None => Ok(today),
    }
}
