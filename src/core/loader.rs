//! Fetch-then-assemble for each report.
//!
//! The roster (groups and labourers) is required: without it there is
//! nothing to report on. Every other fetch degrades to empty data with a
//! warning, so one failing aggregate shows zeros instead of hiding the
//! whole report.

use crate::core::attendance::resolve_day;
use crate::core::backend::LabourBackend;
use crate::core::day_counter::unique_working_days;
use crate::core::ledger::{WageLedger, payment_log};
use crate::core::packets::{cumulative, snapshot};
use crate::core::report::{DaySheet, LedgerReport, WorkReport, attendance_sheets, ledger_report, work_report};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::AttendanceTotal;
use crate::models::group::LabourGroup;
use crate::models::labourer::{Labourer, roster_of};
use crate::models::payment::Payment;
use chrono::NaiveDate;

/// A report value plus the non-fatal problems met while loading it.
#[derive(Debug)]
pub struct Loaded<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

fn fallback<T: Default>(result: AppResult<T>, what: &str, warnings: &mut Vec<String>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            warnings.push(format!("Could not load {what}: {e}; showing zero"));
            T::default()
        }
    }
}

fn select_groups(groups: Vec<LabourGroup>, only: Option<i64>) -> AppResult<Vec<LabourGroup>> {
    match only {
        None => Ok(groups),
        Some(id) => {
            let selected: Vec<LabourGroup> = groups.into_iter().filter(|g| g.id == id).collect();
            if selected.is_empty() {
                Err(AppError::UnknownGroup(id))
            } else {
                Ok(selected)
            }
        }
    }
}

pub struct ReportLoader;

impl ReportLoader {
    /// Ledger as of `date`: day figures from that date's sheets and
    /// payments, running figures from the totals aggregate up to `date`.
    pub fn ledger<B: LabourBackend + ?Sized>(
        backend: &mut B,
        date: NaiveDate,
        only_group: Option<i64>,
    ) -> AppResult<Loaded<LedgerReport>> {
        let mut warnings = Vec::new();

        let groups = select_groups(backend.groups()?, only_group)?;
        let labourers = backend.labourers()?;

        let running_totals = fallback(backend.attendance_totals(Some(date)), "attendance totals", &mut warnings);
        let payments = fallback(backend.payments(), "payments", &mut warnings);
        let history = fallback(backend.attendance_history(), "attendance history", &mut warnings);

        let mut day_totals: Vec<AttendanceTotal> = Vec::new();
        for group in &groups {
            match backend.attendance(date, group.id) {
                Ok(sheet) => {
                    let roster = roster_of(&labourers, group.id);
                    day_totals.extend(resolve_day(&sheet.rows, &roster).into_iter().map(
                        |(labourer_id, status)| AttendanceTotal {
                            labourer_id,
                            total_days: status.credit(),
                        },
                    ));
                }
                Err(e) => warnings.push(format!(
                    "Could not load attendance of {} on {date}: {e}; showing zero",
                    group.name
                )),
            }
        }

        let paid_on_day: Vec<Payment> = payments.iter().filter(|p| p.payment_date == date).cloned().collect();
        let paid_to_date: Vec<Payment> = payments.into_iter().filter(|p| p.payment_date <= date).collect();

        let history_to_date: Vec<_> = history.into_iter().filter(|r| r.date <= date).collect();
        let unique = unique_working_days(&history_to_date, &labourers);

        let report = ledger_report(
            date,
            &groups,
            &labourers,
            &WageLedger::new(&day_totals, &paid_on_day)?,
            &WageLedger::new(&running_totals, &paid_to_date)?,
            &unique,
        )?;

        Ok(Loaded {
            value: report,
            warnings,
        })
    }

    /// Work report for `date`: snapshot next to cumulative-to-date.
    pub fn work<B: LabourBackend + ?Sized>(backend: &mut B, date: NaiveDate) -> AppResult<Loaded<WorkReport>> {
        let mut warnings = Vec::new();
        let groups = backend.groups()?;

        let on_day = fallback(backend.group_work(Some(date), Some(date)), "work of the day", &mut warnings);
        let to_date = fallback(backend.group_work(None, Some(date)), "work history", &mut warnings);

        let report = work_report(
            date,
            &groups,
            &snapshot(&on_day, date, &groups),
            &cumulative(&to_date, date, &groups)?,
        );

        Ok(Loaded {
            value: report,
            warnings,
        })
    }

    pub fn attendance_history<B: LabourBackend + ?Sized>(backend: &mut B) -> AppResult<Loaded<Vec<DaySheet>>> {
        let mut warnings = Vec::new();
        let groups = backend.groups()?;
        let labourers = backend.labourers()?;
        let history = fallback(backend.attendance_history(), "attendance history", &mut warnings);

        Ok(Loaded {
            value: attendance_sheets(&history, &labourers, &groups),
            warnings,
        })
    }

    /// Payment log of one labourer, most recent first.
    pub fn payments_of<B: LabourBackend + ?Sized>(
        backend: &mut B,
        labourer_id: i64,
    ) -> AppResult<(Labourer, Vec<Payment>)> {
        let labourer = backend
            .labourers()?
            .into_iter()
            .find(|l| l.id == labourer_id)
            .ok_or(AppError::UnknownLabourer(labourer_id))?;
        let payments = backend.payments()?;
        Ok((labourer, payment_log(&payments, labourer_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::backend::SqliteBackend;
    use crate::models::attendance::{AttendanceRecord, AttendanceRow, AttendanceSheet, AttendanceStatus};
    use crate::models::group_work::{GroupWorkRecord, PacketCounts};
    use crate::models::labourer::NewLabourer;
    use crate::models::payment::{NewPayment, PaymentType};
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, day).unwrap()
    }

    /// Group G with A (wage 300) full and B (wage 250) half on day 10,
    /// one payment of 300 to A.
    fn scenario() -> (SqliteBackend, i64, i64, i64) {
        let mut b = SqliteBackend::in_memory().unwrap().with_today(d(10));
        let g = b.add_group("G").unwrap().id;
        let add = |b: &mut SqliteBackend, name: &str, wage| {
            b.add_labourer(&NewLabourer {
                name: name.into(),
                village: "Kota".into(),
                group_id: g,
                daily_wage: Some(wage),
                phone: None,
            })
            .unwrap()
            .id
        };
        let a = add(&mut b, "A", dec!(300));
        let bb = add(&mut b, "B", dec!(250));

        b.replace_attendance(
            d(10),
            g,
            0,
            &[
                AttendanceRow {
                    labourer_id: a,
                    status: AttendanceStatus::Full,
                },
                AttendanceRow {
                    labourer_id: bb,
                    status: AttendanceStatus::Half,
                },
            ],
        )
        .unwrap();
        b.record_payment(&NewPayment {
            labourer_id: a,
            amount: dec!(300),
            payment_date: d(10),
            payment_type: PaymentType::Daily,
            notes: String::new(),
        })
        .unwrap();

        (b, g, a, bb)
    }

    /// Delegates to SQLite but fails the selected reads.
    struct Flaky {
        inner: SqliteBackend,
        fail_payments: bool,
        fail_labourers: bool,
    }

    impl LabourBackend for Flaky {
        fn groups(&mut self) -> AppResult<Vec<LabourGroup>> {
            self.inner.groups()
        }
        fn labourers(&mut self) -> AppResult<Vec<Labourer>> {
            if self.fail_labourers {
                return Err(AppError::Backend("roster timeout".into()));
            }
            self.inner.labourers()
        }
        fn attendance(&mut self, date: NaiveDate, group_id: i64) -> AppResult<AttendanceSheet> {
            self.inner.attendance(date, group_id)
        }
        fn attendance_totals(&mut self, until: Option<NaiveDate>) -> AppResult<Vec<AttendanceTotal>> {
            self.inner.attendance_totals(until)
        }
        fn attendance_history(&mut self) -> AppResult<Vec<AttendanceRecord>> {
            self.inner.attendance_history()
        }
        fn replace_attendance(
            &mut self,
            date: NaiveDate,
            group_id: i64,
            base_revision: i64,
            rows: &[AttendanceRow],
        ) -> AppResult<i64> {
            self.inner.replace_attendance(date, group_id, base_revision, rows)
        }
        fn payments(&mut self) -> AppResult<Vec<Payment>> {
            if self.fail_payments {
                return Err(AppError::Backend("payments timeout".into()));
            }
            self.inner.payments()
        }
        fn record_payment(&mut self, payment: &NewPayment) -> AppResult<Payment> {
            self.inner.record_payment(payment)
        }
        fn group_work(
            &mut self,
            start: Option<NaiveDate>,
            end: Option<NaiveDate>,
        ) -> AppResult<Vec<GroupWorkRecord>> {
            self.inner.group_work(start, end)
        }
        fn save_group_work(&mut self, record: &GroupWorkRecord) -> AppResult<GroupWorkRecord> {
            self.inner.save_group_work(record)
        }
    }

    #[test]
    fn ledger_matches_the_two_labourer_scenario() {
        let (mut b, g, a, bb) = scenario();
        let loaded = ReportLoader::ledger(&mut b, d(10), None).unwrap();
        assert!(loaded.warnings.is_empty());

        let report = loaded.value;
        let row = |id| report.rows.iter().find(|r| r.labourer_id == id).unwrap();
        assert_eq!(row(a).to_date.earnings, dec!(300));
        assert_eq!(row(a).to_date.balance, dec!(0));
        assert_eq!(row(bb).to_date.earnings, dec!(125));
        assert_eq!(row(bb).to_date.balance, dec!(125));
        assert_eq!(row(bb).as_of.total_working_days, dec!(0.5));

        let group = &report.groups[0];
        assert_eq!(group.group_id, g);
        assert_eq!(group.unique_working_days, 1);
        assert_eq!(group.total_owed, dec!(125));
        assert_eq!(group.total_overpaid, dec!(0));
    }

    #[test]
    fn ledger_before_any_work_is_all_zero() {
        let (mut b, _, a, _) = scenario();
        let report = ReportLoader::ledger(&mut b, d(9), None).unwrap().value;
        let row = report.rows.iter().find(|r| r.labourer_id == a).unwrap();
        assert_eq!(row.to_date.total_working_days, dec!(0));
        assert_eq!(row.to_date.paid, dec!(0));
        assert_eq!(report.groups[0].unique_working_days, 0);
    }

    #[test]
    fn failed_payments_fetch_degrades_to_zero_with_warning() {
        let (inner, _, a, _) = scenario();
        let mut b = Flaky {
            inner,
            fail_payments: true,
            fail_labourers: false,
        };
        let loaded = ReportLoader::ledger(&mut b, d(10), None).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("payments"));

        let row = loaded.value.rows.iter().find(|r| r.labourer_id == a).unwrap();
        assert_eq!(row.to_date.paid, dec!(0));
        assert_eq!(row.to_date.balance, dec!(300));
    }

    #[test]
    fn roster_failure_is_fatal() {
        let (inner, _, _, _) = scenario();
        let mut b = Flaky {
            inner,
            fail_payments: false,
            fail_labourers: true,
        };
        assert!(matches!(
            ReportLoader::ledger(&mut b, d(10), None),
            Err(AppError::Backend(_))
        ));
    }

    #[test]
    fn unknown_group_filter_is_rejected() {
        let (mut b, _, _, _) = scenario();
        assert!(matches!(
            ReportLoader::ledger(&mut b, d(10), Some(99)),
            Err(AppError::UnknownGroup(99))
        ));
    }

    #[test]
    fn work_report_pairs_snapshot_with_cumulative() {
        let (mut b, g, _, _) = scenario();
        b.save_group_work(&GroupWorkRecord {
            group_id: g,
            work_date: d(10),
            counts: PacketCounts {
                small: 5,
                medium: 3,
                total: 8,
                ..Default::default()
            },
            notes: "east rows".into(),
        })
        .unwrap();

        let on_day = ReportLoader::work(&mut b, d(10)).unwrap().value;
        assert_eq!(on_day.rows[0].as_of.total, 8);
        assert_eq!(on_day.rows[0].to_date.total, 8);
        assert_eq!(on_day.rows[0].notes, "east rows");

        let next_day = ReportLoader::work(&mut b, d(11)).unwrap().value;
        assert_eq!(next_day.rows[0].as_of.total, 0);
        assert_eq!(next_day.rows[0].to_date.total, 8);
    }

    #[test]
    fn payment_log_of_unknown_labourer_fails() {
        let (mut b, _, a, _) = scenario();
        let (labourer, log) = ReportLoader::payments_of(&mut b, a).unwrap();
        assert_eq!(labourer.name, "A");
        assert_eq!(log.len(), 1);
        assert!(matches!(
            ReportLoader::payments_of(&mut b, 404),
            Err(AppError::UnknownLabourer(404))
        ));
    }
}
