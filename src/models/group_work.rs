use super::upsert::{Mergeable, UpsertPolicy};
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use serde::Serialize;

/// Harvest-packet counts by size class, plus the stored total.
///
/// `total` is stored, not derived: it normally equals the sum of the four
/// size classes but may carry a manual override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PacketCounts {
    pub small: i64,
    pub medium: i64,
    pub large: i64,
    pub overlarge: i64,
    pub total: i64,
}

impl PacketCounts {
    /// Sum of the four size classes, `None` on overflow.
    pub fn size_class_sum(&self) -> Option<i64> {
        self.small
            .checked_add(self.medium)?
            .checked_add(self.large)?
            .checked_add(self.overlarge)
    }

    /// Field-wise addition, used for cumulative reads. `None` if any
    /// field overflows.
    pub fn checked_add(&self, other: &PacketCounts) -> Option<PacketCounts> {
        Some(PacketCounts {
            small: self.small.checked_add(other.small)?,
            medium: self.medium.checked_add(other.medium)?,
            large: self.large.checked_add(other.large)?,
            overlarge: self.overlarge.checked_add(other.overlarge)?,
            total: self.total.checked_add(other.total)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupWorkRecord {
    pub group_id: i64,
    pub work_date: NaiveDate,
    pub counts: PacketCounts,
    pub notes: String,
}

impl GroupWorkRecord {
    /// A repeated save for the same (group, date) replaces the record.
    pub const UPSERT_POLICY: UpsertPolicy = UpsertPolicy::Overwrite;
}

impl Mergeable for GroupWorkRecord {
    fn accumulate(mut self, incoming: Self) -> AppResult<Self> {
        self.counts = self.counts.checked_add(&incoming.counts).ok_or_else(|| {
            AppError::InvalidPacketCounts(format!(
                "packets of group {} on {} overflow when added",
                self.group_id, self.work_date
            ))
        })?;
        if !incoming.notes.is_empty() {
            self.notes = incoming.notes;
        }
        Ok(self)
    }
}

/// Packet counts as entered by the user, before validation.
/// A missing size class counts as 0; a missing total means "sum them".
#[derive(Debug, Clone, Default)]
pub struct PacketInput {
    pub small: Option<i64>,
    pub medium: Option<i64>,
    pub large: Option<i64>,
    pub overlarge: Option<i64>,
    pub total: Option<i64>,
    pub notes: Option<String>,
}

impl PacketInput {
    /// Validate and turn the input into stored counts.
    ///
    /// Negative counts and a non-positive resulting total are rejected.
    pub fn into_counts(&self) -> AppResult<PacketCounts> {
        let fields = [
            ("small", self.small),
            ("medium", self.medium),
            ("large", self.large),
            ("overlarge", self.overlarge),
            ("total", self.total),
        ];
        for (name, value) in fields {
            if let Some(v) = value
                && v < 0
            {
                return Err(AppError::InvalidPacketCounts(format!(
                    "{name} cannot be negative ({v})"
                )));
            }
        }

        let mut counts = PacketCounts {
            small: self.small.unwrap_or(0),
            medium: self.medium.unwrap_or(0),
            large: self.large.unwrap_or(0),
            overlarge: self.overlarge.unwrap_or(0),
            total: 0,
        };
        let sum = counts.size_class_sum().ok_or_else(|| {
            AppError::InvalidPacketCounts("sum of the size classes is too large".into())
        })?;
        counts.total = self.total.unwrap_or(sum);

        if counts.total <= 0 {
            return Err(AppError::InvalidPacketCounts(format!(
                "total must be greater than zero, got {}",
                counts.total
            )));
        }

        Ok(counts)
    }
}
