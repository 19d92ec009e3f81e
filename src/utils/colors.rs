//! ANSI color helper utilities for terminal output.

use rust_decimal::Decimal;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";

/// Balance color:
/// \>0 (still owed) → yellow
/// \<0 (overpaid) → red
/// 0 → green
pub fn color_for_balance(value: Decimal) -> &'static str {
    if value > Decimal::ZERO {
        YELLOW
    } else if value < Decimal::ZERO {
        RED
    } else {
        GREEN
    }
}

pub fn paint(color: &str, value: &str) -> String {
    format!("{color}{value}{RESET}")
}

/// Grey out a cell that carries no data.
pub fn dim_if_empty(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "-" {
        paint(GREY, value)
    } else {
        value.to_string()
    }
}
