//! Report assembly.
//!
//! Pure joins of ledger, packet and day-count outputs into the row sets
//! the external renderer consumes. No I/O: the same inputs always give
//! the same rows.

use crate::core::ledger::{GroupLedger, WageLedger};
use crate::core::packets::GroupPackets;
use crate::errors::AppResult;
use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::group::{LabourGroup, find_group};
use crate::models::group_work::PacketCounts;
use crate::models::labourer::{Labourer, roster_of};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerFigures {
    pub total_working_days: Decimal,
    pub earnings: Decimal,
    pub paid: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub labourer_id: i64,
    pub labourer: String,
    pub village: String,
    pub group: String,
    pub daily_wage: Decimal,
    /// credit and payments dated exactly on the report date
    pub as_of: LedgerFigures,
    /// everything up to and including the report date
    pub to_date: LedgerFigures,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerReport {
    pub date: NaiveDate,
    pub rows: Vec<LedgerRow>,
    pub groups: Vec<GroupLedger>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkReportRow {
    pub group_id: i64,
    pub group: String,
    pub as_of: PacketCounts,
    pub to_date: PacketCounts,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkReport {
    pub date: NaiveDate,
    pub rows: Vec<WorkReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySheetRow {
    pub labourer_id: i64,
    pub name: String,
    pub village: String,
    pub status: AttendanceStatus,
    pub credit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySheet {
    pub date: NaiveDate,
    pub group_id: i64,
    pub group: String,
    pub rows: Vec<DaySheetRow>,
}

/// One row per labourer of the selected groups, day figures next to
/// running figures, plus the per-group summaries of the running ledger.
pub fn ledger_report(
    date: NaiveDate,
    groups: &[LabourGroup],
    labourers: &[Labourer],
    day: &WageLedger,
    to_date: &WageLedger,
    unique_days: &BTreeMap<i64, usize>,
) -> AppResult<LedgerReport> {
    let mut rows = Vec::new();
    let mut summaries = Vec::new();

    for group in groups {
        for labourer in roster_of(labourers, group.id) {
            let d = day.labourer(labourer)?;
            let t = to_date.labourer(labourer)?;
            rows.push(LedgerRow {
                labourer_id: labourer.id,
                labourer: labourer.name.clone(),
                village: labourer.village.clone(),
                group: group.name.clone(),
                daily_wage: t.daily_wage,
                as_of: LedgerFigures {
                    total_working_days: d.total_working_days,
                    earnings: d.earnings,
                    paid: d.paid,
                    balance: d.balance,
                },
                to_date: LedgerFigures {
                    total_working_days: t.total_working_days,
                    earnings: t.earnings,
                    paid: t.paid,
                    balance: t.balance,
                },
            });
        }

        let days = unique_days.get(&group.id).copied().unwrap_or(0);
        summaries.push(to_date.group(group, labourers, days)?);
    }

    Ok(LedgerReport {
        date,
        rows,
        groups: summaries,
    })
}

/// One row per group pairing the snapshot with the cumulative sum.
/// Groups missing from either input read as zero.
pub fn work_report(
    date: NaiveDate,
    groups: &[LabourGroup],
    snapshot: &[GroupPackets],
    cumulative: &[GroupPackets],
) -> WorkReport {
    let snap: HashMap<i64, &GroupPackets> = snapshot.iter().map(|p| (p.group_id, p)).collect();
    let cum: HashMap<i64, &GroupPackets> = cumulative.iter().map(|p| (p.group_id, p)).collect();

    let rows = groups
        .iter()
        .map(|g| WorkReportRow {
            group_id: g.id,
            group: g.name.clone(),
            as_of: snap.get(&g.id).map(|p| p.counts).unwrap_or_default(),
            to_date: cum.get(&g.id).map(|p| p.counts).unwrap_or_default(),
            notes: snap.get(&g.id).map(|p| p.notes.clone()).unwrap_or_default(),
        })
        .collect();

    WorkReport { date, rows }
}

/// History regrouped as day sheets: by date, then group name, then
/// labourer name. Rows of labourers no longer on any roster are dropped.
pub fn attendance_sheets(
    history: &[AttendanceRecord],
    labourers: &[Labourer],
    groups: &[LabourGroup],
) -> Vec<DaySheet> {
    let by_id: HashMap<i64, &Labourer> = labourers.iter().map(|l| (l.id, l)).collect();

    let mut grouped: BTreeMap<(NaiveDate, i64), Vec<DaySheetRow>> = BTreeMap::new();
    for rec in history {
        let Some(l) = by_id.get(&rec.labourer_id) else {
            continue;
        };
        grouped.entry((rec.date, l.group_id)).or_default().push(DaySheetRow {
            labourer_id: l.id,
            name: l.name.clone(),
            village: l.village.clone(),
            status: rec.status,
            credit: rec.status.credit(),
        });
    }

    let mut sheets: Vec<DaySheet> = grouped
        .into_iter()
        .map(|((date, group_id), mut rows)| {
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            DaySheet {
                date,
                group_id,
                group: find_group(groups, group_id)
                    .map(|g| g.name.clone())
                    .unwrap_or_else(|| group_id.to_string()),
                rows,
            }
        })
        .collect();

    sheets.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.group.cmp(&b.group)));
    sheets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::AttendanceTotal;
    use crate::models::payment::{Payment, PaymentType};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn group(id: i64, name: &str) -> LabourGroup {
        LabourGroup {
            id,
            name: name.into(),
        }
    }

    fn labourer(id: i64, name: &str, group_id: i64, wage: Decimal) -> Labourer {
        Labourer {
            id,
            name: name.into(),
            village: "Kota".into(),
            group_id,
            daily_wage: Some(wage),
            phone: None,
        }
    }

    fn packets(group_id: i64, total: i64) -> GroupPackets {
        GroupPackets {
            group_id,
            group_name: String::new(),
            counts: PacketCounts {
                small: total,
                total,
                ..Default::default()
            },
            notes: "rain".into(),
        }
    }

    #[test]
    fn ledger_rows_pair_day_and_running_figures() {
        let groups = vec![group(1, "G")];
        let labourers = vec![labourer(1, "A", 1, dec!(300)), labourer(2, "B", 1, dec!(250))];
        let pay = Payment {
            id: 1,
            labourer_id: 1,
            amount: dec!(300),
            payment_date: day(2),
            payment_type: PaymentType::Daily,
            notes: String::new(),
        };
        let day_ledger = WageLedger::new(
            &[AttendanceTotal {
                labourer_id: 1,
                total_days: dec!(1),
            }],
            &[],
        )
        .unwrap();
        let running = WageLedger::new(
            &[
                AttendanceTotal {
                    labourer_id: 1,
                    total_days: dec!(3),
                },
                AttendanceTotal {
                    labourer_id: 2,
                    total_days: dec!(0.5),
                },
            ],
            &[pay],
        )
        .unwrap();
        let unique = BTreeMap::from([(1, 3)]);

        let report = ledger_report(day(3), &groups, &labourers, &day_ledger, &running, &unique).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].as_of.earnings, dec!(300));
        assert_eq!(report.rows[0].as_of.paid, dec!(0));
        assert_eq!(report.rows[0].to_date.balance, dec!(600));
        assert_eq!(report.rows[1].to_date.balance, dec!(125));
        assert_eq!(report.groups[0].unique_working_days, 3);
        assert_eq!(report.groups[0].total_owed, dec!(725));
    }

    #[test]
    fn work_report_is_deterministic_and_zero_filled() {
        let groups = vec![group(1, "North"), group(2, "South")];
        let snap = vec![packets(1, 8)];
        let cum = vec![packets(1, 20), packets(2, 4)];

        let a = work_report(day(5), &groups, &snap, &cum);
        let b = work_report(day(5), &groups, &snap, &cum);
        assert_eq!(a, b);
        assert_eq!(a.rows[0].as_of.total, 8);
        assert_eq!(a.rows[0].to_date.total, 20);
        assert_eq!(a.rows[0].notes, "rain");
        assert_eq!(a.rows[1].as_of.total, 0);
        assert_eq!(a.rows[1].to_date.total, 4);
    }

    #[test]
    fn attendance_sheets_are_sorted() {
        let groups = vec![group(1, "Zeta"), group(2, "Alpha")];
        let labourers = vec![
            labourer(1, "Ravi", 1, dec!(1)),
            labourer(2, "Anu", 1, dec!(1)),
            labourer(3, "Mira", 2, dec!(1)),
        ];
        let history = vec![
            AttendanceRecord {
                labourer_id: 1,
                date: day(2),
                status: AttendanceStatus::Full,
            },
            AttendanceRecord {
                labourer_id: 2,
                date: day(2),
                status: AttendanceStatus::Half,
            },
            AttendanceRecord {
                labourer_id: 3,
                date: day(2),
                status: AttendanceStatus::Absent,
            },
            AttendanceRecord {
                labourer_id: 3,
                date: day(1),
                status: AttendanceStatus::Full,
            },
            AttendanceRecord {
                labourer_id: 77,
                date: day(1),
                status: AttendanceStatus::Full,
            },
        ];

        let sheets = attendance_sheets(&history, &labourers, &groups);
        assert_eq!(sheets.len(), 3);
        assert_eq!((sheets[0].date, sheets[0].group.as_str()), (day(1), "Alpha"));
        assert_eq!((sheets[1].date, sheets[1].group.as_str()), (day(2), "Alpha"));
        assert_eq!(sheets[2].group, "Zeta");
        assert_eq!(sheets[2].rows[0].name, "Anu");
        assert_eq!(sheets[2].rows[0].credit, dec!(0.5));
    }
}
