use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Attendance status of one labourer on one day.
///
/// `Unset` only lives inside the engine: it means "no row was recorded".
/// It is never written to the backend and only turns into an absence at
/// the credit boundary ([`AttendanceStatus::credit`]) or when a save
/// payload is built ([`AttendanceStatus::resolved`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Full,
    Half,
    Absent,
    #[default]
    Unset,
}

impl AttendanceStatus {
    /// Day credit: full=1, half=0.5, absent/unset=0.
    pub fn credit(&self) -> Decimal {
        match self {
            AttendanceStatus::Full => dec!(1),
            AttendanceStatus::Half => dec!(0.5),
            AttendanceStatus::Absent | AttendanceStatus::Unset => Decimal::ZERO,
        }
    }

    /// Status as it must be persisted.
    pub fn resolved(&self) -> Self {
        match self {
            AttendanceStatus::Unset => AttendanceStatus::Absent,
            other => *other,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, AttendanceStatus::Unset)
    }

    /// Convert enum → DB string. `Unset` has no DB form.
    pub fn to_db_str(&self) -> &'static str {
        match self.resolved() {
            AttendanceStatus::Full => "full",
            AttendanceStatus::Half => "half",
            _ => "absent",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "full" => Some(AttendanceStatus::Full),
            "half" => Some(AttendanceStatus::Half),
            "absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    /// Helper: parse user input (case-insensitive, accepts f/h/a).
    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "f" | "full" => Some(AttendanceStatus::Full),
            "h" | "half" => Some(AttendanceStatus::Half),
            "a" | "absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Full => "Full Day",
            AttendanceStatus::Half => "Half Day",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Unset => "Not marked",
        }
    }
}

/// One row of the per-day attendance endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRow {
    pub labourer_id: i64,
    pub status: AttendanceStatus,
}

/// One row of the unbounded history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub labourer_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Server-side aggregate: Σ credit over every record of a labourer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceTotal {
    pub labourer_id: i64,
    pub total_days: Decimal,
}

/// Attendance rows of one group on one day, with the revision the
/// backend holds for that (group, date) pair. Revision 0 means the sheet
/// was never saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSheet {
    pub group_id: i64,
    pub date: NaiveDate,
    pub rows: Vec<AttendanceRow>,
    pub revision: i64,
}
