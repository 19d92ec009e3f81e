pub mod attendance;
pub mod config;
pub mod group;
pub mod init;
pub mod labourer;
pub mod ledger;
pub mod log;
pub mod pay;
pub mod work;

use crate::config::Config;
use crate::db::backend::SqliteBackend;
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Open the configured database with the backend clock pinned to `today`.
pub(crate) fn open_backend(cfg: &Config, today: NaiveDate) -> AppResult<SqliteBackend> {
    Ok(SqliteBackend::open(&cfg.database)?.with_today(today))
}

pub(crate) fn parse_amount(s: &str) -> AppResult<Decimal> {
    Decimal::from_str(s.trim()).map_err(|_| AppError::InvalidAmount(s.to_string()))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| AppError::Serialization(e.to_string()))?;
    println!("{json}");
    Ok(())
}
