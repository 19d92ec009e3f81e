use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::loader::ReportLoader;
use crate::core::report::LedgerReport;
use crate::errors::AppResult;
use crate::ui::messages::{header, info, warnings};
use crate::utils::colors::{color_for_balance, paint};
use crate::utils::date::parse_date_or;
use crate::utils::formatting::{bold, fmt_days, fmt_money};
use crate::utils::table::{Column, Table};
use chrono::NaiveDate;

use super::{open_backend, print_json};

pub fn handle(cmd: &Commands, cfg: &Config, today: NaiveDate) -> AppResult<()> {
    if let Commands::Ledger { group, date, json } = cmd {
        let date = parse_date_or(date.as_deref(), today)?;
        let mut backend = open_backend(cfg, today)?;

        let loaded = ReportLoader::ledger(&mut backend, date, *group)?;
        warnings(&loaded.warnings);

        if *json {
            return print_json(&loaded.value);
        }
        print_ledger(&loaded.value, &cfg.currency);
    }

    Ok(())
}

fn print_ledger(report: &LedgerReport, currency: &str) {
    if report.rows.is_empty() {
        info("No labourers to report on");
        return;
    }

    header(format!("Wage ledger · {}", report.date));

    let mut table = Table::new(vec![
        Column::left("Labourer"),
        Column::left("Village"),
        Column::left("Group"),
        Column::right("Wage"),
        Column::right("Days today"),
        Column::right("Days to date"),
        Column::right("Earned to date"),
        Column::right("Paid to date"),
        Column::right("Balance"),
    ]);
    for r in &report.rows {
        let balance = fmt_money(currency, r.to_date.balance);
        table.add_row(vec![
            r.labourer.clone(),
            r.village.clone(),
            r.group.clone(),
            fmt_money(currency, r.daily_wage),
            fmt_days(r.as_of.total_working_days),
            fmt_days(r.to_date.total_working_days),
            fmt_money(currency, r.to_date.earnings),
            fmt_money(currency, r.to_date.paid),
            paint(color_for_balance(r.to_date.balance), &balance),
        ]);
    }
    print!("{}", table.render());
    println!();

    let mut groups = Table::new(vec![
        Column::left("Group"),
        Column::right("Working days"),
        Column::right("Earnings"),
        Column::right("Paid"),
        Column::right("To pay"),
        Column::right("Overpaid"),
    ]);
    for g in &report.groups {
        groups.add_row(vec![
            bold(&g.group_name),
            g.unique_working_days.to_string(),
            fmt_money(currency, g.total_earnings),
            fmt_money(currency, g.total_paid),
            fmt_money(currency, g.total_owed),
            fmt_money(currency, g.total_overpaid),
        ]);
    }
    print!("{}", groups.render());
}
