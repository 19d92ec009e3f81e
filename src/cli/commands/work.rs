use crate::cli::parser::WorkAction;
use crate::config::Config;
use crate::core::loader::ReportLoader;
use crate::core::packets;
use crate::core::report::WorkReport;
use crate::errors::{AppError, AppResult};
use crate::models::group_work::{PacketCounts, PacketInput};
use crate::ui::messages::{error, header, success, warnings};
use crate::utils::date::parse_date_or;
use crate::utils::table::{Column, Table};
use chrono::NaiveDate;

use super::{open_backend, print_json};

pub fn handle(action: &WorkAction, cfg: &Config, today: NaiveDate) -> AppResult<()> {
    match action {
        WorkAction::Save {
            group,
            date,
            small,
            medium,
            large,
            overlarge,
            total,
            notes,
        } => {
            let date = parse_date_or(date.as_deref(), today)?;
            let input = PacketInput {
                small: *small,
                medium: *medium,
                large: *large,
                overlarge: *overlarge,
                total: *total,
                notes: notes.clone(),
            };
            // validation happens before the database is opened
            input.into_counts()?;

            let mut backend = open_backend(cfg, today)?;
            let stored = packets::save(&mut backend, *group, date, &input)?;
            success(format!(
                "Saved {} packets for group {} on {}",
                stored.counts.total, stored.group_id, stored.work_date
            ));
        }

        WorkAction::Batch { date, entries } => {
            let date = parse_date_or(date.as_deref(), today)?;
            let parsed = entries
                .iter()
                .map(String::as_str)
                .map(parse_entry)
                .collect::<AppResult<Vec<_>>>()?;

            let mut backend = open_backend(cfg, today)?;
            let mut failed = 0;
            for (group_id, result) in packets::save_batch(&mut backend, date, &parsed) {
                match result {
                    Ok(rec) => success(format!("Group {group_id}: saved {} packets", rec.counts.total)),
                    Err(e) => {
                        failed += 1;
                        error(format!("Group {group_id}: {e}"));
                    }
                }
            }
            if failed > 0 {
                return Err(AppError::Other(format!(
                    "{failed} of {} group(s) not saved",
                    parsed.len()
                )));
            }
        }

        WorkAction::Report { date, json } => {
            let date = parse_date_or(date.as_deref(), today)?;
            let mut backend = open_backend(cfg, today)?;

            let loaded = ReportLoader::work(&mut backend, date)?;
            warnings(&loaded.warnings);

            if *json {
                return print_json(&loaded.value);
            }
            print_report(&loaded.value);
        }
    }

    Ok(())
}

/// `GROUP=S,M,L,O` with an optional fifth value overriding the total.
fn parse_entry(s: &str) -> AppResult<(i64, PacketInput)> {
    let bad = || AppError::InvalidPacketCounts(format!("expected GROUP=S,M,L,O[,T], got '{s}'"));

    let (group, counts) = s.split_once('=').ok_or_else(bad)?;
    let group: i64 = group.trim().parse().map_err(|_| bad())?;
    let values = counts
        .split(',')
        .map(|v| v.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| bad())?;

    let [small, medium, large, overlarge, rest @ ..] = values.as_slice() else {
        return Err(bad());
    };
    let total = match rest {
        [] => None,
        [t] => Some(*t),
        _ => return Err(bad()),
    };

    Ok((
        group,
        PacketInput {
            small: Some(*small),
            medium: Some(*medium),
            large: Some(*large),
            overlarge: Some(*overlarge),
            total,
            notes: None,
        },
    ))
}

fn counts_cells(c: &PacketCounts) -> [String; 5] {
    [
        c.small.to_string(),
        c.medium.to_string(),
        c.large.to_string(),
        c.overlarge.to_string(),
        c.total.to_string(),
    ]
}

fn print_report(report: &WorkReport) {
    header(format!("Harvest packets · {}", report.date));

    let mut table = Table::new(vec![
        Column::left("Group"),
        Column::right("Small"),
        Column::right("Medium"),
        Column::right("Large"),
        Column::right("Overlarge"),
        Column::right("Total"),
        Column::right("Small*"),
        Column::right("Medium*"),
        Column::right("Large*"),
        Column::right("Overlarge*"),
        Column::right("Total*"),
        Column::left("Notes"),
    ]);
    for r in &report.rows {
        let mut row = vec![r.group.clone()];
        row.extend(counts_cells(&r.as_of));
        row.extend(counts_cells(&r.to_date));
        row.push(r.notes.clone());
        table.add_row(row);
    }
    print!("{}", table.render());
    println!("\n* till date");
}
