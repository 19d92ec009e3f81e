//! Unified application error type.
//! Engine, backend, cli and utils all return AppError so the binary can
//! report every failure the same way.

use chrono::NaiveDate;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / transport
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Backend unavailable: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid attendance status: {0}")]
    InvalidStatus(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid payment type: {0}")]
    InvalidPaymentType(String),

    // ---------------------------
    // Validation errors
    // ---------------------------
    #[error("Attendance for {date} is read-only: only today ({today}) can be edited")]
    AttendanceLocked { date: NaiveDate, today: NaiveDate },

    #[error(
        "Attendance for group {group_id} on {date} was changed by someone else \
         (expected revision {expected}, found {found}); reload and retry"
    )]
    StaleAttendance {
        group_id: i64,
        date: NaiveDate,
        expected: i64,
        found: i64,
    },

    #[error("Invalid packet counts: {0}")]
    InvalidPacketCounts(String),

    #[error("Unknown labour group: {0}")]
    UnknownGroup(i64),

    #[error("Unknown labourer: {0}")]
    UnknownLabourer(i64),

    #[error("Labourer {labourer_id} is not in the roster of group {group_id}")]
    NotInRoster { labourer_id: i64, group_id: i64 },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Transport failures and revision conflicts can be retried as-is;
    /// everything else needs different input first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Io(_) | AppError::Db(_) | AppError::Backend(_) | AppError::StaleAttendance { .. }
        )
    }

    /// What to tell the user after a retryable failure.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::StaleAttendance { .. } => Some("Reload the attendance sheet and save again"),
            e if e.is_retryable() => Some("The failure may be temporary: retry the command"),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
