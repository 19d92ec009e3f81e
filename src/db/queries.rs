use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRecord, AttendanceRow, AttendanceStatus};
use crate::models::group::LabourGroup;
use crate::models::group_work::{GroupWorkRecord, PacketCounts};
use crate::models::labourer::{Labourer, NewLabourer};
use crate::models::payment::{NewPayment, Payment, PaymentType};
use chrono::{Local, NaiveDate};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use rust_decimal::Decimal;
use std::str::FromStr;

fn conversion_error(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err))
}

fn date_col(row: &Row, col: &str) -> Result<NaiveDate> {
    let s: String = row.get(col)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| conversion_error(AppError::InvalidDate(s)))
}

fn decimal_col(row: &Row, col: &str) -> Result<Decimal> {
    let s: String = row.get(col)?;
    Decimal::from_str(&s).map_err(|_| conversion_error(AppError::InvalidAmount(s)))
}

fn opt_decimal_col(row: &Row, col: &str) -> Result<Option<Decimal>> {
    let s: Option<String> = row.get(col)?;
    match s {
        Some(s) if !s.trim().is_empty() => Decimal::from_str(&s)
            .map(Some)
            .map_err(|_| conversion_error(AppError::InvalidAmount(s))),
        _ => Ok(None),
    }
}

fn status_col(row: &Row, col: &str) -> Result<AttendanceStatus> {
    let s: String = row.get(col)?;
    AttendanceStatus::from_db_str(&s).ok_or_else(|| conversion_error(AppError::InvalidStatus(s)))
}

fn collect<T>(rows: impl Iterator<Item = Result<T>>) -> AppResult<Vec<T>> {
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn now() -> String {
    Local::now().to_rfc3339()
}

// ---------------------------
// Groups and labourers
// ---------------------------

pub fn insert_group(conn: &Connection, name: &str) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO labour_groups (name, created_at) VALUES (?1, ?2)",
        params![name, now()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_groups(conn: &Connection) -> AppResult<Vec<LabourGroup>> {
    let mut stmt = conn.prepare("SELECT id, name FROM labour_groups ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(LabourGroup {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    })?;
    collect(rows)
}

pub fn group_exists(conn: &Connection, group_id: i64) -> AppResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM labour_groups WHERE id = ?1",
            [group_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn insert_labourer(conn: &Connection, new: &NewLabourer) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO labourers (name, village, group_id, daily_wage, phone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.name,
            new.village,
            new.group_id,
            new.daily_wage.map(|w| w.to_string()),
            new.phone,
            now()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn map_labourer(row: &Row) -> Result<Labourer> {
    Ok(Labourer {
        id: row.get("id")?,
        name: row.get("name")?,
        village: row.get("village")?,
        group_id: row.get("group_id")?,
        daily_wage: opt_decimal_col(row, "daily_wage")?,
        phone: row.get("phone")?,
    })
}

pub fn load_labourers(conn: &Connection) -> AppResult<Vec<Labourer>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, village, group_id, daily_wage, phone
         FROM labourers
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], map_labourer)?;
    collect(rows)
}

pub fn load_labourer(conn: &Connection, id: i64) -> AppResult<Option<Labourer>> {
    let labourer = conn
        .query_row(
            "SELECT id, name, village, group_id, daily_wage, phone
             FROM labourers WHERE id = ?1",
            [id],
            map_labourer,
        )
        .optional()?;
    Ok(labourer)
}

pub fn roster_ids(conn: &Connection, group_id: i64) -> AppResult<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM labourers WHERE group_id = ?1 ORDER BY id")?;
    let rows = stmt.query_map([group_id], |row| row.get(0))?;
    collect(rows)
}

// ---------------------------
// Attendance
// ---------------------------

/// Rows recorded on `date` for the current members of `group_id`.
pub fn load_attendance_for(
    conn: &Connection,
    date: NaiveDate,
    group_id: i64,
) -> AppResult<Vec<AttendanceRow>> {
    let mut stmt = conn.prepare(
        "SELECT a.labourer_id, a.status
         FROM attendance a
         JOIN labourers l ON l.id = a.labourer_id
         WHERE a.attendance_date = ?1 AND l.group_id = ?2
         ORDER BY a.labourer_id",
    )?;
    let rows = stmt.query_map(params![day(date), group_id], |row| {
        Ok(AttendanceRow {
            labourer_id: row.get("labourer_id")?,
            status: status_col(row, "status")?,
        })
    })?;
    collect(rows)
}

/// Every attendance record, optionally bounded by `until` (inclusive).
pub fn load_attendance_history(
    conn: &Connection,
    until: Option<NaiveDate>,
) -> AppResult<Vec<AttendanceRecord>> {
    let mut stmt = conn.prepare(
        "SELECT labourer_id, attendance_date, status
         FROM attendance
         WHERE ?1 IS NULL OR attendance_date <= ?1
         ORDER BY attendance_date ASC, labourer_id ASC",
    )?;
    let rows = stmt.query_map([until.map(day)], |row| {
        Ok(AttendanceRecord {
            labourer_id: row.get("labourer_id")?,
            date: date_col(row, "attendance_date")?,
            status: status_col(row, "status")?,
        })
    })?;
    collect(rows)
}

/// Drop the rows of every current member of `group_id` on `date`.
pub fn delete_attendance_for(conn: &Connection, date: NaiveDate, group_id: i64) -> AppResult<usize> {
    let n = conn.execute(
        "DELETE FROM attendance
         WHERE attendance_date = ?1
           AND labourer_id IN (SELECT id FROM labourers WHERE group_id = ?2)",
        params![day(date), group_id],
    )?;
    Ok(n)
}

pub fn upsert_attendance(conn: &Connection, date: NaiveDate, row: &AttendanceRow) -> AppResult<()> {
    conn.execute(
        "INSERT INTO attendance (labourer_id, attendance_date, status, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(labourer_id, attendance_date)
         DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at",
        params![row.labourer_id, day(date), row.status.to_db_str(), now()],
    )?;
    Ok(())
}

/// Stored revision of a (group, date) sheet, 0 when never saved.
pub fn load_revision(conn: &Connection, group_id: i64, date: NaiveDate) -> AppResult<i64> {
    let rev = conn
        .query_row(
            "SELECT revision FROM attendance_revisions
             WHERE group_id = ?1 AND attendance_date = ?2",
            params![group_id, day(date)],
            |row| row.get(0),
        )
        .optional()?;
    Ok(rev.unwrap_or(0))
}

pub fn store_revision(conn: &Connection, group_id: i64, date: NaiveDate, revision: i64) -> AppResult<()> {
    conn.execute(
        "INSERT INTO attendance_revisions (group_id, attendance_date, revision)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(group_id, attendance_date) DO UPDATE SET revision = excluded.revision",
        params![group_id, day(date), revision],
    )?;
    Ok(())
}

// ---------------------------
// Payments
// ---------------------------

pub fn insert_payment(conn: &Connection, p: &NewPayment) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO payments (labourer_id, amount, payment_date, payment_type, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            p.labourer_id,
            p.amount.to_string(),
            day(p.payment_date),
            p.payment_type.to_db_str(),
            p.notes,
            now()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn map_payment(row: &Row) -> Result<Payment> {
    let kind: String = row.get("payment_type")?;
    let payment_type = PaymentType::from_db_str(&kind)
        .ok_or_else(|| conversion_error(AppError::InvalidPaymentType(kind)))?;

    Ok(Payment {
        id: row.get("id")?,
        labourer_id: row.get("labourer_id")?,
        amount: decimal_col(row, "amount")?,
        payment_date: date_col(row, "payment_date")?,
        payment_type,
        notes: row.get("notes")?,
    })
}

/// All payments, most recent first.
pub fn load_payments(conn: &Connection) -> AppResult<Vec<Payment>> {
    let mut stmt = conn.prepare(
        "SELECT id, labourer_id, amount, payment_date, payment_type, notes
         FROM payments
         ORDER BY payment_date DESC, id DESC",
    )?;
    let rows = stmt.query_map([], map_payment)?;
    collect(rows)
}

// ---------------------------
// Group work
// ---------------------------

pub fn map_group_work(row: &Row) -> Result<GroupWorkRecord> {
    Ok(GroupWorkRecord {
        group_id: row.get("group_id")?,
        work_date: date_col(row, "work_date")?,
        counts: PacketCounts {
            small: row.get("small_packets")?,
            medium: row.get("medium_packets")?,
            large: row.get("large_packets")?,
            overlarge: row.get("overlarge_packets")?,
            total: row.get("total_packets")?,
        },
        notes: row.get("notes")?,
    })
}

const GROUP_WORK_COLUMNS: &str = "group_id, work_date, small_packets, medium_packets, \
     large_packets, overlarge_packets, total_packets, notes";

/// Records inside the inclusive bounds, newest date first.
pub fn load_group_work(
    conn: &Connection,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> AppResult<Vec<GroupWorkRecord>> {
    let sql = format!(
        "SELECT {GROUP_WORK_COLUMNS} FROM group_work
         WHERE (?1 IS NULL OR work_date >= ?1)
           AND (?2 IS NULL OR work_date <= ?2)
         ORDER BY work_date DESC, group_id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![start.map(day), end.map(day)], map_group_work)?;
    collect(rows)
}

pub fn load_group_work_entry(
    conn: &Connection,
    group_id: i64,
    date: NaiveDate,
) -> AppResult<Option<GroupWorkRecord>> {
    let sql = format!(
        "SELECT {GROUP_WORK_COLUMNS} FROM group_work
         WHERE group_id = ?1 AND work_date = ?2"
    );
    let rec = conn
        .query_row(&sql, params![group_id, day(date)], map_group_work)
        .optional()?;
    Ok(rec)
}

/// Store `rec` as the one record for its (group, date).
pub fn upsert_group_work(conn: &Connection, rec: &GroupWorkRecord) -> AppResult<()> {
    let c = &rec.counts;
    conn.execute(
        "INSERT INTO group_work (group_id, work_date, small_packets, medium_packets,
                                 large_packets, overlarge_packets, total_packets, notes, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(group_id, work_date) DO UPDATE SET
             small_packets = excluded.small_packets,
             medium_packets = excluded.medium_packets,
             large_packets = excluded.large_packets,
             overlarge_packets = excluded.overlarge_packets,
             total_packets = excluded.total_packets,
             notes = excluded.notes,
             updated_at = excluded.updated_at",
        params![
            rec.group_id,
            day(rec.work_date),
            c.small,
            c.medium,
            c.large,
            c.overlarge,
            c.total,
            rec.notes,
            now()
        ],
    )?;
    Ok(())
}
