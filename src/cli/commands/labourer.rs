use crate::cli::parser::LabourerAction;
use crate::config::Config;
use crate::core::backend::LabourBackend;
use crate::errors::AppResult;
use crate::models::group::find_group;
use crate::models::labourer::NewLabourer;
use crate::ui::messages::{info, success};
use crate::utils::colors::dim_if_empty;
use crate::utils::formatting::fmt_optional_money;
use crate::utils::table::{Column, Table};
use chrono::NaiveDate;

use super::{open_backend, parse_amount};

pub fn handle(action: &LabourerAction, cfg: &Config, today: NaiveDate) -> AppResult<()> {
    let mut backend = open_backend(cfg, today)?;

    match action {
        LabourerAction::Add {
            name,
            village,
            wage,
            group,
            phone,
        } => {
            let daily_wage = wage.as_deref().map(parse_amount).transpose()?;
            let labourer = backend.add_labourer(&NewLabourer {
                name: name.trim().to_string(),
                village: village.trim().to_string(),
                group_id: *group,
                daily_wage,
                phone: phone.clone(),
            })?;
            success(format!(
                "Labourer '{}' added with id {} to group {}",
                labourer.name, labourer.id, labourer.group_id
            ));
        }
        LabourerAction::List => {
            let labourers = backend.labourers()?;
            if labourers.is_empty() {
                info("No labourers yet");
                return Ok(());
            }
            let groups = backend.groups()?;

            let mut table = Table::new(vec![
                Column::right("ID"),
                Column::left("Name"),
                Column::left("Village"),
                Column::left("Group"),
                Column::right("Daily wage"),
                Column::left("Phone"),
            ]);
            for l in &labourers {
                let group = find_group(&groups, l.group_id)
                    .map(|g| g.name.clone())
                    .unwrap_or_else(|| l.group_id.to_string());
                table.add_row(vec![
                    l.id.to_string(),
                    l.name.clone(),
                    l.village.clone(),
                    group,
                    dim_if_empty(&fmt_optional_money(&cfg.currency, l.daily_wage)),
                    dim_if_empty(l.phone.as_deref().unwrap_or("-")),
                ]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
