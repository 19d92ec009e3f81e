//! SQLite implementation of [`LabourBackend`].
//!
//! Besides storage, the backend enforces the write rules on its own side:
//! attendance can only be replaced for `today`, the sheet revision must
//! match the one the caller loaded, and group work follows the record's
//! upsert policy.

use crate::core::attendance::resolve_totals;
use crate::core::backend::LabourBackend;
use crate::db::initialize::init_db;
use crate::db::log::write_log;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRecord, AttendanceRow, AttendanceSheet, AttendanceTotal};
use crate::models::group::LabourGroup;
use crate::models::group_work::GroupWorkRecord;
use crate::models::labourer::{Labourer, NewLabourer};
use crate::models::payment::{NewPayment, Payment};
use crate::models::upsert::merge;
use crate::utils::date;
use chrono::NaiveDate;

pub struct SqliteBackend {
    pool: DbPool,
    today: NaiveDate,
}

impl SqliteBackend {
    /// Open (and migrate) the database file at `path`.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self {
            pool,
            today: date::today(),
        })
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self {
            pool,
            today: date::today(),
        })
    }

    /// Override the server-side clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }


    pub fn add_group(&mut self, name: &str) -> AppResult<LabourGroup> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Other("group name cannot be empty".into()));
        }

        let id = queries::insert_group(&self.pool.conn, name)?;
        write_log(&self.pool.conn, "group", &id.to_string(), &format!("Added group '{name}'"))?;

        Ok(LabourGroup {
            id,
            name: name.to_string(),
        })
    }

    pub fn add_labourer(&mut self, new: &NewLabourer) -> AppResult<Labourer> {
        new.validate()?;
        if !queries::group_exists(&self.pool.conn, new.group_id)? {
            return Err(AppError::UnknownGroup(new.group_id));
        }

        let id = queries::insert_labourer(&self.pool.conn, new)?;
        write_log(
            &self.pool.conn,
            "labourer",
            &id.to_string(),
            &format!("Added labourer '{}' to group {}", new.name, new.group_id),
        )?;

        queries::load_labourer(&self.pool.conn, id)?.ok_or(AppError::UnknownLabourer(id))
    }
}

impl LabourBackend for SqliteBackend {
    fn groups(&mut self) -> AppResult<Vec<LabourGroup>> {
        queries::load_groups(&self.pool.conn)
    }

    fn labourers(&mut self) -> AppResult<Vec<Labourer>> {
        queries::load_labourers(&self.pool.conn)
    }

    fn attendance(&mut self, date: NaiveDate, group_id: i64) -> AppResult<AttendanceSheet> {
        let conn = &self.pool.conn;
        if !queries::group_exists(conn, group_id)? {
            return Err(AppError::UnknownGroup(group_id));
        }

        Ok(AttendanceSheet {
            group_id,
            date,
            rows: queries::load_attendance_for(conn, date, group_id)?,
            revision: queries::load_revision(conn, group_id, date)?,
        })
    }

    fn attendance_totals(&mut self, until: Option<NaiveDate>) -> AppResult<Vec<AttendanceTotal>> {
        let history = queries::load_attendance_history(&self.pool.conn, until)?;
        Ok(resolve_totals(&history)
            .into_iter()
            .map(|(labourer_id, total_days)| AttendanceTotal {
                labourer_id,
                total_days,
            })
            .collect())
    }

    fn attendance_history(&mut self) -> AppResult<Vec<AttendanceRecord>> {
        queries::load_attendance_history(&self.pool.conn, None)
    }

    fn replace_attendance(
        &mut self,
        date: NaiveDate,
        group_id: i64,
        base_revision: i64,
        rows: &[AttendanceRow],
    ) -> AppResult<i64> {
        if date != self.today {
            return Err(AppError::AttendanceLocked {
                date,
                today: self.today,
            });
        }

        let tx = self.pool.conn.transaction()?;

        if !queries::group_exists(&tx, group_id)? {
            return Err(AppError::UnknownGroup(group_id));
        }

        let roster = queries::roster_ids(&tx, group_id)?;
        if let Some(stranger) = rows.iter().find(|r| !roster.contains(&r.labourer_id)) {
            return Err(AppError::NotInRoster {
                labourer_id: stranger.labourer_id,
                group_id,
            });
        }

        let found = queries::load_revision(&tx, group_id, date)?;
        if found != base_revision {
            return Err(AppError::StaleAttendance {
                group_id,
                date,
                expected: base_revision,
                found,
            });
        }

        queries::delete_attendance_for(&tx, date, group_id)?;
        for row in rows {
            queries::upsert_attendance(&tx, date, row)?;
        }

        let revision = found + 1;
        queries::store_revision(&tx, group_id, date, revision)?;

        write_log(
            &tx,
            "attendance",
            &format!("group {group_id} {date}"),
            &format!("Saved {} rows (revision {revision})", rows.len()),
        )?;

        tx.commit()?;
        Ok(revision)
    }

    fn payments(&mut self) -> AppResult<Vec<Payment>> {
        queries::load_payments(&self.pool.conn)
    }

    fn record_payment(&mut self, payment: &NewPayment) -> AppResult<Payment> {
        payment.validate()?;

        let conn = &self.pool.conn;
        if queries::load_labourer(conn, payment.labourer_id)?.is_none() {
            return Err(AppError::UnknownLabourer(payment.labourer_id));
        }

        let id = queries::insert_payment(conn, payment)?;
        write_log(
            conn,
            "payment",
            &payment.labourer_id.to_string(),
            &format!(
                "Paid {} ({}) on {}",
                payment.amount,
                payment.payment_type.to_db_str(),
                payment.payment_date
            ),
        )?;

        Ok(Payment {
            id,
            labourer_id: payment.labourer_id,
            amount: payment.amount,
            payment_date: payment.payment_date,
            payment_type: payment.payment_type,
            notes: payment.notes.clone(),
        })
    }

    fn group_work(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Vec<GroupWorkRecord>> {
        queries::load_group_work(&self.pool.conn, start, end)
    }

    fn save_group_work(&mut self, record: &GroupWorkRecord) -> AppResult<GroupWorkRecord> {
        if record.counts.total <= 0 {
            return Err(AppError::InvalidPacketCounts(format!(
                "total must be greater than zero, got {}",
                record.counts.total
            )));
        }

        let tx = self.pool.conn.transaction()?;

        if !queries::group_exists(&tx, record.group_id)? {
            return Err(AppError::UnknownGroup(record.group_id));
        }

        let existing = queries::load_group_work_entry(&tx, record.group_id, record.work_date)?;
        let replaced = existing.is_some();
        let stored = merge(GroupWorkRecord::UPSERT_POLICY, existing, record.clone())?;
        queries::upsert_group_work(&tx, &stored)?;

        write_log(
            &tx,
            "work",
            &format!("group {} {}", record.group_id, record.work_date),
            &format!(
                "{} {} packets",
                if replaced { "Updated" } else { "Saved" },
                stored.counts.total
            ),
        )?;

        tx.commit()?;
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::AttendanceStatus;
    use crate::models::group_work::PacketCounts;
    use crate::models::payment::PaymentType;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn seeded(today: NaiveDate) -> (SqliteBackend, i64, i64, i64) {
        let mut b = SqliteBackend::in_memory().unwrap().with_today(today);
        let g = b.add_group("North field").unwrap();
        let a = b
            .add_labourer(&NewLabourer {
                name: "Asha".into(),
                village: "Kota".into(),
                group_id: g.id,
                daily_wage: Some(dec!(300)),
                phone: None,
            })
            .unwrap();
        let r = b
            .add_labourer(&NewLabourer {
                name: "Ravi".into(),
                village: "Kota".into(),
                group_id: g.id,
                daily_wage: Some(dec!(250)),
                phone: Some("98450".into()),
            })
            .unwrap();
        (b, g.id, a.id, r.id)
    }

    fn row(labourer_id: i64, status: AttendanceStatus) -> AttendanceRow {
        AttendanceRow { labourer_id, status }
    }

    #[test]
    fn replace_rejects_other_days() {
        let today = d(2025, 7, 2);
        let (mut b, g, a, _) = seeded(today);
        let err = b
            .replace_attendance(d(2025, 7, 1), g, 0, &[row(a, AttendanceStatus::Full)])
            .unwrap_err();
        assert!(matches!(err, AppError::AttendanceLocked { .. }));
        assert!(b.attendance_history().unwrap().is_empty());
    }

    #[test]
    fn replace_bumps_revision_and_rejects_stale_writes() {
        let today = d(2025, 7, 2);
        let (mut b, g, a, r) = seeded(today);

        let rev = b
            .replace_attendance(today, g, 0, &[row(a, AttendanceStatus::Full), row(r, AttendanceStatus::Half)])
            .unwrap();
        assert_eq!(rev, 1);

        let stale = b
            .replace_attendance(today, g, 0, &[row(a, AttendanceStatus::Absent)])
            .unwrap_err();
        assert!(matches!(stale, AppError::StaleAttendance { expected: 0, found: 1, .. }));

        let sheet = b.attendance(today, g).unwrap();
        assert_eq!(sheet.revision, 1);
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn replace_is_a_full_replace_of_the_sheet() {
        let today = d(2025, 7, 2);
        let (mut b, g, a, r) = seeded(today);

        b.replace_attendance(today, g, 0, &[row(a, AttendanceStatus::Full), row(r, AttendanceStatus::Full)])
            .unwrap();
        b.replace_attendance(today, g, 1, &[row(a, AttendanceStatus::Half)])
            .unwrap();

        let sheet = b.attendance(today, g).unwrap();
        assert_eq!(sheet.rows, vec![row(a, AttendanceStatus::Half)]);
    }

    #[test]
    fn replace_rejects_labourers_outside_the_group() {
        let today = d(2025, 7, 2);
        let (mut b, g, _, _) = seeded(today);
        let err = b
            .replace_attendance(today, g, 0, &[row(999, AttendanceStatus::Full)])
            .unwrap_err();
        assert!(matches!(err, AppError::NotInRoster { labourer_id: 999, .. }));
    }

    #[test]
    fn totals_can_be_bounded_by_date() {
        let (mut b, g, a, _) = seeded(d(2025, 7, 1));
        b.replace_attendance(d(2025, 7, 1), g, 0, &[row(a, AttendanceStatus::Full)])
            .unwrap();

        let mut b = b.with_today(d(2025, 7, 2));
        b.replace_attendance(d(2025, 7, 2), g, 0, &[row(a, AttendanceStatus::Half)])
            .unwrap();

        let all = b.attendance_totals(None).unwrap();
        assert_eq!(all[0].total_days, dec!(1.5));
        let bounded = b.attendance_totals(Some(d(2025, 7, 1))).unwrap();
        assert_eq!(bounded[0].total_days, dec!(1));
    }

    #[test]
    fn group_work_overwrites_same_day() {
        let today = d(2025, 7, 2);
        let (mut b, g, _, _) = seeded(today);
        let rec = |small| GroupWorkRecord {
            group_id: g,
            work_date: today,
            counts: PacketCounts {
                small,
                total: small,
                ..Default::default()
            },
            notes: String::new(),
        };

        b.save_group_work(&rec(10)).unwrap();
        let stored = b.save_group_work(&rec(20)).unwrap();
        assert_eq!(stored.counts.total, 20);

        let all = b.group_work(None, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].counts.small, 20);
    }

    #[test]
    fn payments_round_trip_most_recent_first() {
        let (mut b, _, a, _) = seeded(d(2025, 7, 2));
        for (day, amount) in [(1, dec!(100)), (3, dec!(50.25)), (2, dec!(75))] {
            b.record_payment(&NewPayment {
                labourer_id: a,
                amount,
                payment_date: d(2025, 7, day),
                payment_type: PaymentType::Advance,
                notes: String::new(),
            })
            .unwrap();
        }

        let payments = b.payments().unwrap();
        let dates: Vec<u32> = payments.iter().map(|p| chrono::Datelike::day(&p.payment_date)).collect();
        assert_eq!(dates, vec![3, 2, 1]);
        assert_eq!(payments[0].amount, dec!(50.25));
        assert_eq!(payments[0].payment_type, PaymentType::Advance);
    }

    #[test]
    fn oversized_wage_is_rejected() {
        let (mut b, g, _, _) = seeded(d(2025, 7, 2));
        let err = b
            .add_labourer(&NewLabourer {
                name: "Mani".into(),
                village: "Kota".into(),
                group_id: g,
                daily_wage: Some(rust_decimal::Decimal::MAX),
                phone: None,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount(_)));
        assert_eq!(b.labourers().unwrap().len(), 2);
    }

    #[test]
    fn payment_for_unknown_labourer_is_rejected() {
        let (mut b, _, _, _) = seeded(d(2025, 7, 2));
        let err = b
            .record_payment(&NewPayment {
                labourer_id: 42,
                amount: dec!(10),
                payment_date: d(2025, 7, 2),
                payment_type: PaymentType::Daily,
                notes: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownLabourer(42)));
    }
}
