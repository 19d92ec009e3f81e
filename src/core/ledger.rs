//! Wage ledger: credit × wage − payments.
//!
//! Credit totals come from the backend aggregate, never from client-side
//! history. Balances are signed and never clamped: positive is owed to the
//! labourer, negative is overpaid.

use crate::errors::{AppError, AppResult};
use crate::models::attendance::AttendanceTotal;
use crate::models::group::LabourGroup;
use crate::models::labourer::{Labourer, roster_of};
use crate::models::payment::Payment;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabourerLedger {
    pub labourer_id: i64,
    pub name: String,
    pub village: String,
    pub group_id: i64,
    pub daily_wage: Decimal,
    pub total_working_days: Decimal,
    pub earnings: Decimal,
    pub paid: Decimal,
    pub balance: Decimal,
}

impl LabourerLedger {
    /// Amount still owed to the labourer (0 when settled or overpaid).
    pub fn owed(&self) -> Decimal {
        self.balance.max(Decimal::ZERO)
    }

    /// Amount paid beyond earnings (0 unless overpaid).
    pub fn overpaid(&self) -> Decimal {
        (-self.balance).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupLedger {
    pub group_id: i64,
    pub group_name: String,
    pub unique_working_days: usize,
    pub members: Vec<LabourerLedger>,
    pub total_earnings: Decimal,
    pub total_paid: Decimal,
    /// Σ max(balance, 0): kept apart from `total_overpaid`, never netted.
    pub total_owed: Decimal,
    /// Σ max(−balance, 0)
    pub total_overpaid: Decimal,
}

pub struct WageLedger {
    days: HashMap<i64, Decimal>,
    paid: HashMap<i64, Decimal>,
}

fn out_of_range(what: String) -> AppError {
    AppError::InvalidAmount(format!("{what} is out of range"))
}

/// Adds `amount` into the slot of `id`, failing instead of overflowing.
fn accumulate(map: &mut HashMap<i64, Decimal>, id: i64, amount: Decimal, what: &str) -> AppResult<()> {
    let slot = map.entry(id).or_insert(Decimal::ZERO);
    *slot = slot
        .checked_add(amount)
        .ok_or_else(|| out_of_range(format!("{what} of labourer {id}")))?;
    Ok(())
}

fn checked_sum(mut values: impl Iterator<Item = Decimal>, what: String) -> AppResult<Decimal> {
    values.try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or_else(|| out_of_range(what.clone()))
    })
}

impl WageLedger {
    pub fn new(totals: &[AttendanceTotal], payments: &[Payment]) -> AppResult<Self> {
        let mut days = HashMap::new();
        for t in totals {
            accumulate(&mut days, t.labourer_id, t.total_days, "working days")?;
        }

        let mut paid = HashMap::new();
        for p in payments {
            accumulate(&mut paid, p.labourer_id, p.amount, "amount paid")?;
        }

        Ok(Self { days, paid })
    }

    pub fn total_working_days(&self, labourer_id: i64) -> Decimal {
        self.days.get(&labourer_id).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn paid(&self, labourer_id: i64) -> Decimal {
        self.paid.get(&labourer_id).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn labourer(&self, labourer: &Labourer) -> AppResult<LabourerLedger> {
        let total_working_days = self.total_working_days(labourer.id);
        let daily_wage = labourer.wage_or_zero();
        let earnings = total_working_days
            .checked_mul(daily_wage)
            .ok_or_else(|| out_of_range(format!("earnings of labourer {}", labourer.id)))?;
        let paid = self.paid(labourer.id);
        let balance = earnings
            .checked_sub(paid)
            .ok_or_else(|| out_of_range(format!("balance of labourer {}", labourer.id)))?;

        Ok(LabourerLedger {
            labourer_id: labourer.id,
            name: labourer.name.clone(),
            village: labourer.village.clone(),
            group_id: labourer.group_id,
            daily_wage,
            total_working_days,
            earnings,
            paid,
            balance,
        })
    }

    pub fn group(
        &self,
        group: &LabourGroup,
        labourers: &[Labourer],
        unique_working_days: usize,
    ) -> AppResult<GroupLedger> {
        let members = roster_of(labourers, group.id)
            .into_iter()
            .map(|l| self.labourer(l))
            .collect::<AppResult<Vec<LabourerLedger>>>()?;
        let total = |what: &str, f: fn(&LabourerLedger) -> Decimal| {
            checked_sum(members.iter().map(f), format!("{what} of group {}", group.name))
        };

        Ok(GroupLedger {
            group_id: group.id,
            group_name: group.name.clone(),
            unique_working_days,
            total_earnings: total("total earnings", |m| m.earnings)?,
            total_paid: total("total paid", |m| m.paid)?,
            total_owed: total("total owed", LabourerLedger::owed)?,
            total_overpaid: total("total overpaid", LabourerLedger::overpaid)?,
            members,
        })
    }
}

/// Payments of one labourer, most recent first (ties broken by id).
pub fn payment_log(payments: &[Payment], labourer_id: i64) -> Vec<Payment> {
    let mut log: Vec<Payment> = payments
        .iter()
        .filter(|p| p.labourer_id == labourer_id)
        .cloned()
        .collect();
    log.sort_by(|a, b| {
        b.payment_date
            .cmp(&a.payment_date)
            .then_with(|| b.id.cmp(&a.id))
    });
    log
}
