use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backend::LabourBackend;
use crate::core::loader::ReportLoader;
use crate::errors::{AppError, AppResult};
use crate::models::payment::{NewPayment, PaymentType};
use crate::ui::messages::{header, info, success};
use crate::utils::date::parse_date_or;
use crate::utils::formatting::fmt_money;
use crate::utils::table::{Column, Table};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{open_backend, parse_amount};

/// Handle `pay` and `payments`
pub fn handle(cmd: &Commands, cfg: &Config, today: NaiveDate) -> AppResult<()> {
    match cmd {
        Commands::Pay {
            labourer,
            amount,
            date,
            payment_type,
            notes,
        } => {
            let payment_type = match payment_type {
                Some(t) => PaymentType::from_db_str(t).ok_or_else(|| AppError::InvalidPaymentType(t.clone()))?,
                None => cfg.payment_type()?,
            };
            let payment = NewPayment {
                labourer_id: *labourer,
                amount: parse_amount(amount)?,
                payment_date: parse_date_or(date.as_deref(), today)?,
                payment_type,
                notes: notes.clone().unwrap_or_default(),
            };
            // reject bad amounts before the database is even opened
            payment.validate()?;

            let mut backend = open_backend(cfg, today)?;
            let stored = backend.record_payment(&payment)?;
            success(format!(
                "Recorded {} {} payment #{} to labourer {} on {}",
                fmt_money(&cfg.currency, stored.amount),
                stored.payment_type.to_db_str(),
                stored.id,
                stored.labourer_id,
                stored.payment_date
            ));
        }

        Commands::Payments { labourer } => {
            let mut backend = open_backend(cfg, today)?;
            let (labourer, log) = ReportLoader::payments_of(&mut backend, *labourer)?;

            header(format!("Payments to {} ({})", labourer.name, labourer.village));
            if log.is_empty() {
                info("No payments recorded");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::left("Date"),
                Column::right("Amount"),
                Column::left("Type"),
                Column::left("Notes"),
            ]);
            for p in &log {
                table.add_row(vec![
                    p.payment_date.to_string(),
                    fmt_money(&cfg.currency, p.amount),
                    p.payment_type.to_db_str().to_string(),
                    p.notes.clone(),
                ]);
            }
            print!("{}", table.render());

            let total: Decimal = log.iter().map(|p| p.amount).sum();
            println!("\nTotal paid: {}", fmt_money(&cfg.currency, total));
        }

        _ => {}
    }

    Ok(())
}
