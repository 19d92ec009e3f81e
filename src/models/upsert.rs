//! Conflict policies for keyed saves.
//!
//! Record kinds pick their policy explicitly instead of sharing one
//! implicit behaviour: group work overwrites on (group, date), while a
//! yield-style record would accumulate.

use crate::errors::AppResult;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpsertPolicy {
    /// Last write wins, the stored values are replaced entirely.
    Overwrite,
    /// Incoming values are added to the stored ones.
    Accumulate,
}

/// Values that can be merged on key conflict.
/// Accumulation fails instead of overflowing.
pub trait Mergeable: Sized {
    fn accumulate(self, incoming: Self) -> AppResult<Self>;
}

/// Resolve a keyed save against the stored value, if any.
pub fn merge<T: Mergeable>(policy: UpsertPolicy, existing: Option<T>, incoming: T) -> AppResult<T> {
    match (policy, existing) {
        (_, None) => Ok(incoming),
        (UpsertPolicy::Overwrite, Some(_)) => Ok(incoming),
        (UpsertPolicy::Accumulate, Some(old)) => old.accumulate(incoming),
    }
}
