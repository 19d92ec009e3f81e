//! Harvest-packet aggregation per labour group.
//!
//! Two reads over the same group-work records: the exact-date snapshot and
//! the running sum up to a date. Writes go through [`save`], which
//! validates locally and lets the backend overwrite the (group, date) key.

use crate::core::backend::LabourBackend;
use crate::errors::{AppError, AppResult};
use crate::models::group::LabourGroup;
use crate::models::group_work::{GroupWorkRecord, PacketCounts, PacketInput};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPackets {
    pub group_id: i64,
    pub group_name: String,
    pub counts: PacketCounts,
    pub notes: String,
}

/// One entry per group for exactly `date`. Groups without a record report
/// zero counts, they are never left out.
pub fn snapshot(records: &[GroupWorkRecord], date: NaiveDate, groups: &[LabourGroup]) -> Vec<GroupPackets> {
    groups
        .iter()
        .map(|g| {
            // keys are unique; if a backend ever returns duplicates the last one wins
            let found = records
                .iter()
                .rev()
                .find(|r| r.group_id == g.id && r.work_date == date);
            GroupPackets {
                group_id: g.id,
                group_name: g.name.clone(),
                counts: found.map(|r| r.counts).unwrap_or_default(),
                notes: found.map(|r| r.notes.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

/// Per group, every field summed over records dated on or before `end`.
pub fn cumulative(
    records: &[GroupWorkRecord],
    end: NaiveDate,
    groups: &[LabourGroup],
) -> AppResult<Vec<GroupPackets>> {
    groups
        .iter()
        .map(|g| {
            Ok(GroupPackets {
                group_id: g.id,
                group_name: g.name.clone(),
                counts: cumulative_packets(records, g.id, end)?,
                notes: String::new(),
            })
        })
        .collect()
}

/// Fails when a field of the running sum overflows.
pub fn cumulative_packets(
    records: &[GroupWorkRecord],
    group_id: i64,
    end: NaiveDate,
) -> AppResult<PacketCounts> {
    let mut sum = PacketCounts::default();
    for r in records
        .iter()
        .filter(|r| r.group_id == group_id && r.work_date <= end)
    {
        sum = sum.checked_add(&r.counts).ok_or_else(|| {
            AppError::InvalidPacketCounts(format!(
                "cumulative packets of group {group_id} up to {end} are too large"
            ))
        })?;
    }
    Ok(sum)
}

/// Validate and store one group's counts for `date`.
/// Invalid input is rejected before the backend is called.
pub fn save<B: LabourBackend + ?Sized>(
    backend: &mut B,
    group_id: i64,
    date: NaiveDate,
    input: &PacketInput,
) -> AppResult<GroupWorkRecord> {
    let counts = input.into_counts()?;
    let record = GroupWorkRecord {
        group_id,
        work_date: date,
        counts,
        notes: input.notes.clone().unwrap_or_default(),
    };
    backend.save_group_work(&record)
}

/// Save several groups for the same date, one independent write each.
///
/// Not transactional: a failure leaves earlier writes applied, and every
/// entry gets its own result so failed ones can be retried alone.
pub fn save_batch<B: LabourBackend + ?Sized>(
    backend: &mut B,
    date: NaiveDate,
    entries: &[(i64, PacketInput)],
) -> Vec<(i64, AppResult<GroupWorkRecord>)> {
    entries
        .iter()
        .map(|(group_id, input)| (*group_id, save(backend, *group_id, date, input)))
        .collect()
}
