//! Distinct working days per group.
//!
//! A group "worked" on a date when any of its current members has an
//! attendance record on that date, whatever the status or how many
//! members attended. Rows are attributed to the labourer's group at the
//! time of the call: there is no membership history, so a labourer who
//! moved groups carries their old days to the new group.

use crate::models::attendance::AttendanceRecord;
use crate::models::labourer::Labourer;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// group id → number of distinct calendar dates with any record.
pub fn unique_working_days(
    history: &[AttendanceRecord],
    labourers: &[Labourer],
) -> BTreeMap<i64, usize> {
    group_dates(history, labourers)
        .into_iter()
        .map(|(group_id, dates)| (group_id, dates.len()))
        .collect()
}

/// Same count for a single group; 0 if it has no history.
pub fn unique_working_days_for(
    history: &[AttendanceRecord],
    labourers: &[Labourer],
    group_id: i64,
) -> usize {
    group_dates(history, labourers)
        .get(&group_id)
        .map(BTreeSet::len)
        .unwrap_or(0)
}

fn group_dates(
    history: &[AttendanceRecord],
    labourers: &[Labourer],
) -> BTreeMap<i64, BTreeSet<NaiveDate>> {
    let current_group: HashMap<i64, i64> = labourers.iter().map(|l| (l.id, l.group_id)).collect();

    let mut dates: BTreeMap<i64, BTreeSet<NaiveDate>> = BTreeMap::new();
    for rec in history {
        // labourer removed from the roster: nowhere to attribute the row
        let Some(group_id) = current_group.get(&rec.labourer_id) else {
            continue;
        };
        dates.entry(*group_id).or_default().insert(rec.date);
    }
    dates
}
