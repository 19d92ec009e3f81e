#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rll() -> Command {
    cargo_bin_cmd!("rlabourledger")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rlabourledger.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Run a command against `db_path` with the clock pinned to `today`.
pub fn at(db_path: &str, today: &str, args: &[&str]) -> Command {
    let mut cmd = rll();
    cmd.args(["--db", db_path, "--today", today]).args(args);
    cmd
}

/// Initialize the DB with one group "North" (id 1) holding
/// Asha (id 1, wage 300) and Ravi (id 2, wage 250).
pub fn init_db_with_roster(db_path: &str) {
    rll()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    rll()
        .args(["--db", db_path, "group", "add", "North"])
        .assert()
        .success();

    rll()
        .args([
            "--db", db_path, "labourer", "add", "Asha", "--village", "Kota", "--wage", "300",
            "--group", "1",
        ])
        .assert()
        .success();

    rll()
        .args([
            "--db", db_path, "labourer", "add", "Ravi", "--village", "Kota", "--wage", "250",
            "--group", "1",
        ])
        .assert()
        .success();
}
