use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Largest amount accepted for a single payment or a daily wage.
pub const MAX_AMOUNT: Decimal = dec!(1000000000);

/// Reject amounts outside `0 < amount <= MAX_AMOUNT`, or `>= 0` when
/// `allow_zero` is set.
pub fn check_amount(what: &str, amount: Decimal, allow_zero: bool) -> AppResult<()> {
    let too_small = if allow_zero {
        amount < Decimal::ZERO
    } else {
        amount <= Decimal::ZERO
    };
    if too_small {
        let bound = if allow_zero { "negative" } else { "zero or negative" };
        return Err(AppError::InvalidAmount(format!("{what} cannot be {bound}, got {amount}")));
    }
    if amount > MAX_AMOUNT {
        return Err(AppError::InvalidAmount(format!(
            "{what} cannot exceed {MAX_AMOUNT}, got {amount}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Advance,
    Bonus,
}

impl PaymentType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PaymentType::Daily => "daily",
            PaymentType::Weekly => "weekly",
            PaymentType::Monthly => "monthly",
            PaymentType::Advance => "advance",
            PaymentType::Bonus => "bonus",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Some(PaymentType::Daily),
            "weekly" => Some(PaymentType::Weekly),
            "monthly" => Some(PaymentType::Monthly),
            "advance" => Some(PaymentType::Advance),
            "bonus" => Some(PaymentType::Bonus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub id: i64,
    pub labourer_id: i64,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_type: PaymentType,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub labourer_id: i64,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_type: PaymentType,
    pub notes: String,
}

impl NewPayment {
    /// Payments must carry a strictly positive, bounded amount.
    pub fn validate(&self) -> AppResult<()> {
        check_amount("payment amount", self.amount, false)
    }
}
