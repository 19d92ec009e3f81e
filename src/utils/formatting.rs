//! Formatting utilities used for CLI outputs.

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

static ANSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").expect("valid ANSI regex"));

/// Remove colour codes so widths can be measured on visible text.
pub fn strip_ansi(s: &str) -> String {
    ANSI.replace_all(s, "").into_owned()
}

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// `Rs 1250.50`: money always carries two decimals.
pub fn fmt_money(currency: &str, amount: Decimal) -> String {
    format!("{} {:.2}", currency, amount.round_dp(2))
}

/// Day credit without trailing zeros: `3`, `2.5`.
pub fn fmt_days(days: Decimal) -> String {
    days.normalize().to_string()
}

pub fn fmt_optional_money(currency: &str, amount: Option<Decimal>) -> String {
    match amount {
        Some(a) => fmt_money(currency, a),
        None => "-".to_string(),
    }
}
