//! Labour ledger engine: stateless transforms over fetched records, plus
//! the attendance edit gate.

pub mod attendance;
pub mod backend;
pub mod day_counter;
pub mod fetch;
pub mod gate;
pub mod ledger;
pub mod loader;
pub mod log;
pub mod packets;
pub mod report;
