use super::payment::check_amount;
use crate::errors::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Labourer {
    pub id: i64,
    pub name: String,
    pub village: String,
    pub group_id: i64,      // ⇔ labourers.group_id, current assignment only
    pub daily_wage: Option<Decimal>, // ⇔ labourers.daily_wage (TEXT, nullable)
    pub phone: Option<String>,
}

impl Labourer {
    /// Wage used for earnings; a missing wage earns nothing.
    pub fn wage_or_zero(&self) -> Decimal {
        self.daily_wage.unwrap_or(Decimal::ZERO)
    }
}

/// Input for the minimal roster maintenance command.
#[derive(Debug, Clone)]
pub struct NewLabourer {
    pub name: String,
    pub village: String,
    pub group_id: i64,
    pub daily_wage: Option<Decimal>,
    pub phone: Option<String>,
}

impl NewLabourer {
    /// A name is required; a wage, when given, must be within bounds.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Other("labourer name cannot be empty".into()));
        }
        if let Some(w) = self.daily_wage {
            check_amount("daily wage", w, true)?;
        }
        Ok(())
    }
}

/// Current members of a group, in the order the backend returned them.
pub fn roster_of(labourers: &[Labourer], group_id: i64) -> Vec<&Labourer> {
    labourers.iter().filter(|l| l.group_id == group_id).collect()
}
