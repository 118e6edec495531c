//! Display formatting.

use chrono::{Datelike, NaiveDate};

use crate::config::Locale;

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Long date: `15 de mayo de 2026`, or `May 15, 2026` in English.
pub fn long_date(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::Es => format!(
            "{} de {} de {}",
            date.day(),
            MONTHS_ES[date.month0() as usize],
            date.year()
        ),
        Locale::En => date.format("%B %-d, %Y").to_string(),
    }
}

/// Digits of `raw`, at most `max_len` of them.
pub fn digits_only(raw: &str, max_len: usize) -> String {
    raw.chars().filter(char::is_ascii_digit).take(max_len).collect()
}
