//! Seam to the authoritative backend.
//!
//! The engine never owns persistence: it reads records through this trait,
//! derives its views, and sends writes back through it. The shapes follow
//! the labour REST endpoints (list/create per entity plus the attendance
//! aggregates).

use crate::errors::AppResult;
use crate::models::attendance::{AttendanceRecord, AttendanceRow, AttendanceSheet, AttendanceTotal};
use crate::models::group::LabourGroup;
use crate::models::group_work::GroupWorkRecord;
use crate::models::labourer::Labourer;
use crate::models::payment::{NewPayment, Payment};
use chrono::NaiveDate;

pub trait LabourBackend {
    fn groups(&mut self) -> AppResult<Vec<LabourGroup>>;

    fn labourers(&mut self) -> AppResult<Vec<Labourer>>;

    /// Attendance rows of one group on one day, with the sheet revision.
    fn attendance(&mut self, date: NaiveDate, group_id: i64) -> AppResult<AttendanceSheet>;

    /// Σ credit per labourer, over the whole history or up to and
    /// including `until`.
    fn attendance_totals(&mut self, until: Option<NaiveDate>) -> AppResult<Vec<AttendanceTotal>>;

    /// Every attendance record, unbounded.
    fn attendance_history(&mut self) -> AppResult<Vec<AttendanceRecord>>;

    /// Replace the whole (group, date) sheet.
    ///
    /// `base_revision` is the revision the caller loaded; the backend must
    /// reject the write if the stored revision moved on. Returns the new
    /// revision.
    fn replace_attendance(
        &mut self,
        date: NaiveDate,
        group_id: i64,
        base_revision: i64,
        rows: &[AttendanceRow],
    ) -> AppResult<i64>;

    fn payments(&mut self) -> AppResult<Vec<Payment>>;

    fn record_payment(&mut self, payment: &NewPayment) -> AppResult<Payment>;

    /// Group work records with optional inclusive date bounds.
    fn group_work(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Vec<GroupWorkRecord>>;

    /// Upsert by (group, date) following `GroupWorkRecord::UPSERT_POLICY`.
    fn save_group_work(&mut self, record: &GroupWorkRecord) -> AppResult<GroupWorkRecord>;
}
