//! Presentation formatting for amounts and dates.
//!
//! Every function takes its format explicitly so output never depends on the
//! host locale.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::model::DayEntry;

const MONTHS_ES: [&str; 12] = [
    "ENERO",
    "FEBRERO",
    "MARZO",
    "ABRIL",
    "MAYO",
    "JUNIO",
    "JULIO",
    "AGOSTO",
    "SEPTIEMBRE",
    "OCTUBRE",
    "NOVIEMBRE",
    "DICIEMBRE",
];

/// Currency and digit grouping settings (defaults follow es-PE soles)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NumberFormat {
    pub currency_symbol: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            currency_symbol: "S/".to_string(),
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
        }
    }
}

/// Format an amount with two fraction digits, e.g. `S/ 5,215.60`
pub fn format_currency(amount: Decimal, fmt: &NumberFormat) -> String {
    format!("{} {}", fmt.currency_symbol, format_amount(amount, fmt))
}

/// Format an amount without the currency symbol, e.g. `5,215.60`
pub fn format_amount(amount: Decimal, fmt: &NumberFormat) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);

    let text = rounded.abs().to_string();
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_digits(whole, &fmt.thousands_separator));
    out.push_str(&fmt.decimal_separator);
    out.push_str(frac);
    out
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// `dd-mm-YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// `dd/mm`
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Upper-case Spanish month and year, e.g. `OCTUBRE DE 2025`
pub fn month_year_label(date: NaiveDate) -> String {
    let month = MONTHS_ES
        .get(date.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{} DE {}", month, date.year())
}

/// Text for the "Detalle" column of a detail row
pub fn detail_label(entry: &DayEntry) -> &'static str {
    if entry.is_rest_day {
        "DOMINGO"
    } else {
        "-"
    }
}

/// Shift count printed for a worked day
pub const WORKED_SHIFTS: &str = "01";
