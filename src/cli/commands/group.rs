use crate::cli::parser::GroupAction;
use crate::config::Config;
use crate::core::backend::LabourBackend;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::{Column, Table};
use chrono::NaiveDate;

use super::open_backend;

pub fn handle(action: &GroupAction, cfg: &Config, today: NaiveDate) -> AppResult<()> {
    let mut backend = open_backend(cfg, today)?;

    match action {
        GroupAction::Add { name } => {
            let group = backend.add_group(name)?;
            success(format!("Group '{}' added with id {}", group.name, group.id));
        }
        GroupAction::List => {
            let groups = backend.groups()?;
            if groups.is_empty() {
                info("No labour groups yet");
                return Ok(());
            }

            let labourers = backend.labourers()?;
            let mut table = Table::new(vec![
                Column::right("ID"),
                Column::left("Group"),
                Column::right("Members"),
            ]);
            for g in &groups {
                let members = labourers.iter().filter(|l| l.group_id == g.id).count();
                table.add_row(vec![g.id.to_string(), g.name.clone(), members.to_string()]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
