use crate::cli::parser::AttendanceAction;
use crate::config::Config;
use crate::core::attendance::day_credit;
use crate::core::backend::LabourBackend;
use crate::core::gate::AttendanceEditGate;
use crate::core::loader::ReportLoader;
use crate::core::report::{DaySheet, DaySheetRow};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::AttendanceStatus;
use crate::models::group::{LabourGroup, find_group};
use crate::models::labourer::{Labourer, roster_of};
use crate::ui::messages::{header, info, success, warnings};
use crate::utils::colors::{GREY, paint};
use crate::utils::date::parse_date_or;
use crate::utils::formatting::fmt_days;
use crate::utils::table::{Column, Table};
use chrono::NaiveDate;

use super::{open_backend, print_json};

pub fn handle(action: &AttendanceAction, cfg: &Config, today: NaiveDate) -> AppResult<()> {
    let mut backend = open_backend(cfg, today)?;

    match action {
        AttendanceAction::Show { group, date, json } => {
            let date = parse_date_or(date.as_deref(), today)?;
            let (group, labourers) = load_group(&mut backend, *group)?;
            let roster = roster_of(&labourers, group.id);

            let mut gate = AttendanceEditGate::new(group.id, &roster, date, today);
            let ticket = gate.reload();
            let sheet = backend.attendance(date, group.id)?;
            gate.load(&ticket, sheet);

            let view = day_sheet(&gate, &group, &roster);
            if *json {
                return print_json(&view);
            }

            let mode = if gate.is_editable() {
                "editable"
            } else {
                "read-only"
            };
            header(format!("{} · {} ({mode})", group.name, date));
            print_sheet(&view);
            println!("\nDay credit: {}", fmt_days(day_credit(gate.statuses())));
        }

        AttendanceAction::Save { group, date, set } => {
            let date = parse_date_or(date.as_deref(), today)?;
            let (group, labourers) = load_group(&mut backend, *group)?;
            let roster = roster_of(&labourers, group.id);

            let mut gate = AttendanceEditGate::new(group.id, &roster, date, today);
            let ticket = gate.reload();
            let sheet = backend.attendance(date, group.id)?;
            gate.load(&ticket, sheet);

            for assignment in set {
                let (labourer_id, status) = parse_assignment(assignment)?;
                gate.set_status(labourer_id, status)?;
            }

            let unset = gate.statuses().values().filter(|s| s.is_unset()).count();
            let outcome = gate.save(&mut backend, today)?;

            success(format!(
                "Attendance saved for {} on {} (revision {})",
                group.name, date, outcome.revision
            ));
            if unset > 0 {
                info(format!("{unset} unmarked labourer(s) saved as absent"));
            }
            warnings(&outcome.warnings);

            let mut table = Table::new(vec![
                Column::right("ID"),
                Column::left("Name"),
                Column::left("Today"),
                Column::right("Working days"),
            ]);
            for l in &roster {
                let status = gate.statuses().get(&l.id).copied().unwrap_or_default();
                let days = outcome.totals.get(&l.id).copied().unwrap_or_default();
                table.add_row(vec![
                    l.id.to_string(),
                    l.name.clone(),
                    status.label().to_string(),
                    fmt_days(days),
                ]);
            }
            println!();
            print!("{}", table.render());
            println!("\nGroup working days: {}", outcome.unique_working_days);
        }

        AttendanceAction::History { json } => {
            let loaded = ReportLoader::attendance_history(&mut backend)?;
            warnings(&loaded.warnings);

            if *json {
                return print_json(&loaded.value);
            }
            if loaded.value.is_empty() {
                info("No attendance recorded yet");
                return Ok(());
            }
            for sheet in &loaded.value {
                header(format!("{} · {}", sheet.date, sheet.group));
                print_sheet(sheet);
                println!();
            }
        }
    }

    Ok(())
}

fn load_group<B: LabourBackend>(backend: &mut B, group_id: i64) -> AppResult<(LabourGroup, Vec<Labourer>)> {
    let groups = backend.groups()?;
    let group = find_group(&groups, group_id)
        .cloned()
        .ok_or(AppError::UnknownGroup(group_id))?;
    Ok((group, backend.labourers()?))
}

/// `ID=STATUS`, status accepted as full/half/absent or f/h/a.
fn parse_assignment(s: &str) -> AppResult<(i64, AttendanceStatus)> {
    let (id, status) = s
        .split_once('=')
        .ok_or_else(|| AppError::InvalidStatus(format!("expected ID=STATUS, got '{s}'")))?;
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidStatus(format!("invalid labourer id in '{s}'")))?;
    let status = AttendanceStatus::from_input(status)
        .ok_or_else(|| AppError::InvalidStatus(status.trim().to_string()))?;
    Ok((id, status))
}

fn day_sheet(gate: &AttendanceEditGate, group: &LabourGroup, roster: &[&Labourer]) -> DaySheet {
    let rows = roster
        .iter()
        .map(|l| {
            let status = gate.statuses().get(&l.id).copied().unwrap_or_default();
            DaySheetRow {
                labourer_id: l.id,
                name: l.name.clone(),
                village: l.village.clone(),
                status,
                credit: status.credit(),
            }
        })
        .collect();

    DaySheet {
        date: gate.selected_date(),
        group_id: group.id,
        group: group.name.clone(),
        rows,
    }
}

fn print_sheet(sheet: &DaySheet) {
    let mut table = Table::new(vec![
        Column::right("ID"),
        Column::left("Name"),
        Column::left("Village"),
        Column::left("Status"),
        Column::right("Credit"),
    ]);
    for r in &sheet.rows {
        let status = if r.status.is_unset() {
            paint(GREY, r.status.label())
        } else {
            r.status.label().to_string()
        };
        table.add_row(vec![
            r.labourer_id.to_string(),
            r.name.clone(),
            r.village.clone(),
            status,
            fmt_days(r.credit),
        ]);
    }
    print!("{}", table.render());
}
