//! Attendance edit gate.
//!
//! Attendance is mutable only for the current calendar date. The gate is
//! `Viewing` for any other date and refuses both edits and saves locally,
//! without reaching the backend. A save always sends the whole roster for
//! (group, date) as one replace, so members never touched in the session
//! are written as absent.
//!
//! The backend enforces the same date rule and a sheet revision, so this
//! check is a fast failure path, not the authority.

use crate::core::attendance::resolve_day;
use crate::core::backend::LabourBackend;
use crate::core::day_counter::unique_working_days_for;
use crate::core::fetch::{FetchGuard, FetchTicket};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRow, AttendanceSheet, AttendanceStatus};
use crate::models::labourer::Labourer;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Viewing,
    Editable,
}

impl GateState {
    fn evaluate(selected: NaiveDate, today: NaiveDate) -> Self {
        if selected == today {
            GateState::Editable
        } else {
            GateState::Viewing
        }
    }
}

/// Figures re-read after a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub revision: i64,
    /// totalWorkingDays for every roster member
    pub totals: BTreeMap<i64, Decimal>,
    pub unique_working_days: usize,
    /// Refresh fetches that failed; the save itself went through.
    pub warnings: Vec<String>,
}

pub struct AttendanceEditGate {
    group_id: i64,
    roster: Vec<Labourer>,
    selected_date: NaiveDate,
    today: NaiveDate,
    state: GateState,
    statuses: BTreeMap<i64, AttendanceStatus>,
    revision: i64,
    guard: FetchGuard<(i64, NaiveDate)>,
}

impl AttendanceEditGate {
    /// A gate for `group_id` showing `selected_date`, nothing loaded yet.
    pub fn new(group_id: i64, roster: &[&Labourer], selected_date: NaiveDate, today: NaiveDate) -> Self {
        let roster: Vec<Labourer> = roster.iter().map(|l| (*l).clone()).collect();
        let statuses = resolve_day(&[], &roster.iter().collect::<Vec<_>>());
        Self {
            group_id,
            roster,
            selected_date,
            today,
            state: GateState::evaluate(selected_date, today),
            statuses,
            revision: 0,
            guard: FetchGuard::new(),
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_editable(&self) -> bool {
        self.state == GateState::Editable
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    pub fn statuses(&self) -> &BTreeMap<i64, AttendanceStatus> {
        &self.statuses
    }

    /// Change the selected date. Local edits are dropped and the returned
    /// ticket must accompany the sheet fetched for the new date.
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> FetchTicket<(i64, NaiveDate)> {
        self.selected_date = date;
        self.today = today;
        self.state = GateState::evaluate(date, today);
        self.statuses = resolve_day(&[], &self.roster.iter().collect::<Vec<_>>());
        self.revision = 0;
        self.guard.issue((self.group_id, date))
    }

    /// Ticket for (re)loading the current selection.
    pub fn reload(&mut self) -> FetchTicket<(i64, NaiveDate)> {
        self.guard.issue((self.group_id, self.selected_date))
    }

    /// Apply a fetched sheet. Returns false (and changes nothing) when the
    /// ticket was superseded or the sheet is for another selection.
    pub fn load(&mut self, ticket: &FetchTicket<(i64, NaiveDate)>, sheet: AttendanceSheet) -> bool {
        let Some(sheet) = self.guard.accept(ticket, sheet) else {
            return false;
        };
        if sheet.group_id != self.group_id || sheet.date != self.selected_date {
            return false;
        }

        self.statuses = resolve_day(&sheet.rows, &self.roster.iter().collect::<Vec<_>>());
        self.revision = sheet.revision;
        true
    }

    pub fn set_status(&mut self, labourer_id: i64, status: AttendanceStatus) -> AppResult<()> {
        if !self.is_editable() {
            return Err(AppError::AttendanceLocked {
                date: self.selected_date,
                today: self.today,
            });
        }

        match self.statuses.get_mut(&labourer_id) {
            Some(slot) => {
                *slot = status;
                Ok(())
            }
            None => Err(AppError::NotInRoster {
                labourer_id,
                group_id: self.group_id,
            }),
        }
    }

    /// One row per roster member, unset resolved to absent.
    pub fn payload(&self) -> Vec<AttendanceRow> {
        self.roster
            .iter()
            .map(|l| AttendanceRow {
                labourer_id: l.id,
                status: self
                    .statuses
                    .get(&l.id)
                    .copied()
                    .unwrap_or_default()
                    .resolved(),
            })
            .collect()
    }

    /// Save the whole sheet. `today` is read again here because the
    /// calendar may have moved since the date was selected.
    ///
    /// On failure the local statuses are kept for a retry.
    pub fn save<B: LabourBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        today: NaiveDate,
    ) -> AppResult<SaveOutcome> {
        self.today = today;
        self.state = GateState::evaluate(self.selected_date, today);
        if !self.is_editable() {
            return Err(AppError::AttendanceLocked {
                date: self.selected_date,
                today,
            });
        }

        let rows = self.payload();
        let revision = backend.replace_attendance(self.selected_date, self.group_id, self.revision, &rows)?;
        self.revision = revision;

        // what was saved is now the baseline: no more unset entries
        for row in rows {
            self.statuses.insert(row.labourer_id, row.status);
        }

        Ok(self.refresh(backend, revision))
    }

    fn refresh<B: LabourBackend + ?Sized>(&self, backend: &mut B, revision: i64) -> SaveOutcome {
        let mut warnings = Vec::new();

        let mut totals: BTreeMap<i64, Decimal> =
            self.roster.iter().map(|l| (l.id, Decimal::ZERO)).collect();
        match backend.attendance_totals(None) {
            Ok(rows) => {
                for t in rows {
                    if let Some(slot) = totals.get_mut(&t.labourer_id) {
                        *slot += t.total_days;
                    }
                }
            }
            Err(e) => warnings.push(format!("Could not refresh working days: {e}")),
        }

        let labourers = match backend.labourers() {
            Ok(l) => l,
            Err(e) => {
                warnings.push(format!("Could not refresh roster: {e}"));
                self.roster.clone()
            }
        };

        let unique_working_days = match backend.attendance_history() {
            Ok(history) => unique_working_days_for(&history, &labourers, self.group_id),
            Err(e) => {
                warnings.push(format!("Could not refresh group working days: {e}"));
                0
            }
        };

        SaveOutcome {
            revision,
            totals,
            unique_working_days,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attendance::resolve_totals;
    use crate::models::attendance::{AttendanceRecord, AttendanceTotal};
    use crate::models::group::LabourGroup;
    use crate::models::group_work::GroupWorkRecord;
    use crate::models::payment::{NewPayment, Payment};
    use rust_decimal_macros::dec;

    /// In-memory backend that records how often it was written to.
    #[derive(Default)]
    struct RecordingBackend {
        labourers: Vec<Labourer>,
        history: Vec<AttendanceRecord>,
        revision: i64,
        replace_calls: usize,
        fail_replace: bool,
        fail_totals: bool,
    }

    impl LabourBackend for RecordingBackend {
        fn groups(&mut self) -> AppResult<Vec<LabourGroup>> {
            Ok(vec![])
        }
        fn labourers(&mut self) -> AppResult<Vec<Labourer>> {
            Ok(self.labourers.clone())
        }
        fn attendance(&mut self, date: NaiveDate, group_id: i64) -> AppResult<AttendanceSheet> {
            let rows = self
                .history
                .iter()
                .filter(|r| r.date == date)
                .map(|r| AttendanceRow {
                    labourer_id: r.labourer_id,
                    status: r.status,
                })
                .collect();
            Ok(AttendanceSheet {
                group_id,
                date,
                rows,
                revision: self.revision,
            })
        }
        fn attendance_totals(&mut self, _until: Option<NaiveDate>) -> AppResult<Vec<AttendanceTotal>> {
            if self.fail_totals {
                return Err(AppError::Backend("timeout".into()));
            }
            Ok(resolve_totals(&self.history)
                .into_iter()
                .map(|(labourer_id, total_days)| AttendanceTotal {
                    labourer_id,
                    total_days,
                })
                .collect())
        }
        fn attendance_history(&mut self) -> AppResult<Vec<AttendanceRecord>> {
            Ok(self.history.clone())
        }
        fn replace_attendance(
            &mut self,
            date: NaiveDate,
            _group_id: i64,
            base_revision: i64,
            rows: &[AttendanceRow],
        ) -> AppResult<i64> {
            self.replace_calls += 1;
            if self.fail_replace {
                return Err(AppError::Backend("connection reset".into()));
            }
            assert_eq!(base_revision, self.revision);
            self.history.retain(|r| r.date != date);
            self.history.extend(rows.iter().map(|r| AttendanceRecord {
                labourer_id: r.labourer_id,
                date,
                status: r.status,
            }));
            self.revision += 1;
            Ok(self.revision)
        }
        fn payments(&mut self) -> AppResult<Vec<Payment>> {
            Ok(vec![])
        }
        fn record_payment(&mut self, _payment: &NewPayment) -> AppResult<Payment> {
            Err(AppError::Other("not used".into()))
        }
        fn group_work(
            &mut self,
            _start: Option<NaiveDate>,
            _end: Option<NaiveDate>,
        ) -> AppResult<Vec<GroupWorkRecord>> {
            Ok(vec![])
        }
        fn save_group_work(&mut self, record: &GroupWorkRecord) -> AppResult<GroupWorkRecord> {
            Ok(record.clone())
        }
    }

    fn labourer(id: i64) -> Labourer {
        Labourer {
            id,
            name: format!("L{id}"),
            village: "Kota".into(),
            group_id: 1,
            daily_wage: Some(dec!(200)),
            phone: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    fn backend() -> RecordingBackend {
        RecordingBackend {
            labourers: vec![labourer(1), labourer(2), labourer(3)],
            ..Default::default()
        }
    }

    fn gate_for(b: &RecordingBackend, selected: NaiveDate, today: NaiveDate) -> AttendanceEditGate {
        let roster: Vec<&Labourer> = b.labourers.iter().collect();
        AttendanceEditGate::new(1, &roster, selected, today)
    }

    #[test]
    fn only_today_is_editable() {
        let b = backend();
        let mut gate = gate_for(&b, day(10), day(10));
        assert_eq!(gate.state(), GateState::Editable);

        gate.select_date(day(9), day(10));
        assert_eq!(gate.state(), GateState::Viewing);
        assert!(gate.set_status(1, AttendanceStatus::Full).is_err());

        gate.select_date(day(10), day(10));
        assert!(gate.is_editable());
    }

    #[test]
    fn save_for_other_date_never_reaches_backend() {
        let mut b = backend();
        let mut gate = gate_for(&b, day(9), day(10));
        let err = gate.save(&mut b, day(10)).unwrap_err();
        assert!(matches!(err, AppError::AttendanceLocked { .. }));
        assert_eq!(b.replace_calls, 0);
    }

    #[test]
    fn save_after_midnight_is_rejected() {
        let mut b = backend();
        let mut gate = gate_for(&b, day(10), day(10));
        gate.set_status(1, AttendanceStatus::Full).unwrap();
        assert!(gate.save(&mut b, day(11)).is_err());
        assert_eq!(b.replace_calls, 0);
        assert_eq!(gate.state(), GateState::Viewing);
    }

    #[test]
    fn payload_covers_whole_roster_with_absent_default() {
        let b = backend();
        let mut gate = gate_for(&b, day(10), day(10));
        gate.set_status(2, AttendanceStatus::Half).unwrap();

        let payload = gate.payload();
        assert_eq!(payload.len(), 3);
        assert_eq!(payload[0].status, AttendanceStatus::Absent);
        assert_eq!(payload[1].status, AttendanceStatus::Half);
        assert_eq!(payload[2].status, AttendanceStatus::Absent);
    }

    #[test]
    fn save_replaces_and_refreshes_figures() {
        let mut b = backend();
        b.history.push(AttendanceRecord {
            labourer_id: 1,
            date: day(9),
            status: AttendanceStatus::Full,
        });
        let mut gate = gate_for(&b, day(10), day(10));
        gate.set_status(1, AttendanceStatus::Full).unwrap();
        gate.set_status(2, AttendanceStatus::Half).unwrap();

        let outcome = gate.save(&mut b, day(10)).unwrap();
        assert_eq!(b.replace_calls, 1);
        assert_eq!(outcome.revision, 1);
        assert_eq!(outcome.totals[&1], dec!(2));
        assert_eq!(outcome.totals[&2], dec!(0.5));
        assert_eq!(outcome.totals[&3], dec!(0));
        assert_eq!(outcome.unique_working_days, 2);
        assert!(outcome.warnings.is_empty());

        // saving twice is idempotent
        let again = gate.save(&mut b, day(10)).unwrap();
        assert_eq!(again.totals, outcome.totals);
        assert_eq!(b.history.iter().filter(|r| r.date == day(10)).count(), 3);
    }

    #[test]
    fn failed_save_keeps_local_edits() {
        let mut b = backend();
        b.fail_replace = true;
        let mut gate = gate_for(&b, day(10), day(10));
        gate.set_status(3, AttendanceStatus::Full).unwrap();

        assert!(gate.save(&mut b, day(10)).is_err());
        assert_eq!(gate.statuses()[&3], AttendanceStatus::Full);
        assert_eq!(gate.revision(), 0);
    }

    #[test]
    fn refresh_failure_is_reported_not_fatal() {
        let mut b = backend();
        b.fail_totals = true;
        let mut gate = gate_for(&b, day(10), day(10));
        gate.set_status(1, AttendanceStatus::Full).unwrap();

        let outcome = gate.save(&mut b, day(10)).unwrap();
        assert_eq!(outcome.totals[&1], Decimal::ZERO);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.unique_working_days, 1);
    }

    #[test]
    fn stale_sheet_is_not_applied() {
        let mut b = backend();
        b.history.push(AttendanceRecord {
            labourer_id: 2,
            date: day(8),
            status: AttendanceStatus::Full,
        });
        let mut gate = gate_for(&b, day(10), day(10));

        let old = gate.select_date(day(8), day(10));
        let current = gate.select_date(day(9), day(10));

        let old_sheet = b.attendance(day(8), 1).unwrap();
        assert!(!gate.load(&old, old_sheet));
        assert!(gate.statuses().values().all(AttendanceStatus::is_unset));

        let sheet = b.attendance(day(9), 1).unwrap();
        assert!(gate.load(&current, sheet));
    }
}
