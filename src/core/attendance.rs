//! Attendance credit resolution.
//!
//! Turns the sparse attendance rows the backend returns into a status for
//! every roster member, and statuses into day credit.

use crate::models::attendance::{AttendanceRecord, AttendanceRow, AttendanceStatus};
use crate::models::labourer::Labourer;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Complete labourer → status map for one (group, date).
///
/// Every roster member gets an entry; members without a row are `Unset`.
/// Rows for labourers outside the roster are ignored.
pub fn resolve_day(rows: &[AttendanceRow], roster: &[&Labourer]) -> BTreeMap<i64, AttendanceStatus> {
    let mut statuses: BTreeMap<i64, AttendanceStatus> = roster
        .iter()
        .map(|l| (l.id, AttendanceStatus::Unset))
        .collect();

    for row in rows {
        if let Some(slot) = statuses.get_mut(&row.labourer_id) {
            *slot = row.status;
        }
    }

    statuses
}

/// Σ credit of a resolved day.
pub fn day_credit(statuses: &BTreeMap<i64, AttendanceStatus>) -> Decimal {
    statuses.values().map(AttendanceStatus::credit).sum()
}

/// Σ credit per labourer over raw history rows.
///
/// This is what the backend's totals aggregate serves; the ledger itself
/// consumes the aggregate and never calls this on client-side history.
pub fn resolve_totals(history: &[AttendanceRecord]) -> BTreeMap<i64, Decimal> {
    let mut totals: BTreeMap<i64, Decimal> = BTreeMap::new();
    for rec in history {
        *totals.entry(rec.labourer_id).or_insert(Decimal::ZERO) += rec.status.credit();
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn labourer(id: i64) -> Labourer {
        Labourer {
            id,
            name: format!("L{id}"),
            village: "Kota".into(),
            group_id: 1,
            daily_wage: Some(dec!(300)),
            phone: None,
        }
    }

    fn record(labourer_id: i64, day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            labourer_id,
            date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            status,
        }
    }

    #[test]
    fn empty_rows_give_all_unset() {
        let a = labourer(1);
        let b = labourer(2);
        let statuses = resolve_day(&[], &[&a, &b]);
        assert_eq!(statuses.len(), 2);
        assert!(statuses.values().all(AttendanceStatus::is_unset));
        assert_eq!(day_credit(&statuses), Decimal::ZERO);
    }

    #[test]
    fn rows_fill_in_roster_and_strangers_are_ignored() {
        let a = labourer(1);
        let b = labourer(2);
        let rows = vec![
            AttendanceRow {
                labourer_id: 2,
                status: AttendanceStatus::Half,
            },
            AttendanceRow {
                labourer_id: 99,
                status: AttendanceStatus::Full,
            },
        ];
        let statuses = resolve_day(&rows, &[&a, &b]);
        assert_eq!(statuses[&1], AttendanceStatus::Unset);
        assert_eq!(statuses[&2], AttendanceStatus::Half);
        assert!(!statuses.contains_key(&99));
        assert_eq!(day_credit(&statuses), dec!(0.5));
    }

    #[test]
    fn all_full_totals_equal_record_count() {
        let history: Vec<_> = (1..=4).map(|d| record(7, d, AttendanceStatus::Full)).collect();
        assert_eq!(resolve_totals(&history)[&7], dec!(4));
    }

    #[test]
    fn all_half_totals_equal_half_record_count() {
        let history: Vec<_> = (1..=5).map(|d| record(7, d, AttendanceStatus::Half)).collect();
        assert_eq!(resolve_totals(&history)[&7], dec!(2.5));
    }

    #[test]
    fn explicit_absence_contributes_nothing() {
        let history = vec![
            record(3, 1, AttendanceStatus::Absent),
            record(3, 2, AttendanceStatus::Full),
        ];
        assert_eq!(resolve_totals(&history)[&3], dec!(1));
    }
}
