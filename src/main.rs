//! rLabourLedger main entrypoint.

use rlabourledger::run;
use rlabourledger::ui::messages::{error, info};

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        if let Some(hint) = e.hint() {
            info(hint);
        }
        std::process::exit(1);
    }
}
