//! rLabourLedger library root.
//! Exposes CLI parser, high-level run() function, and internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use chrono::NaiveDate;
use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config, today: NaiveDate) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Group { action } => cli::commands::group::handle(action, cfg, today),
        Commands::Labourer { action } => cli::commands::labourer::handle(action, cfg, today),
        Commands::Attendance { action } => cli::commands::attendance::handle(action, cfg, today),
        Commands::Pay { .. } | Commands::Payments { .. } => {
            cli::commands::pay::handle(&cli.command, cfg, today)
        }
        Commands::Ledger { .. } => cli::commands::ledger::handle(&cli.command, cfg, today),
        Commands::Work { action } => cli::commands::work::handle(action, cfg, today),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    let today = match &cli.today {
        Some(d) => utils::date::parse_date(d)?,
        None => utils::date::today(),
    };

    dispatch(&cli, &cfg, today)
}
