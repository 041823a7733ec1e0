//! Display formatting: Spanish dates and locale-aware amounts.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};
use num_format::{Locale, ToFormattedString};

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

// Values are stamped at local midnight in Chile: 04:00Z in winter, 03:00Z in summer.
// Reading them at UTC-3 lands both on the stamped calendar day.
const STAMP_OFFSET_SECS: i32 = 3 * 3600;

fn chile_day(date: DateTime<Utc>) -> NaiveDateTime {
    FixedOffset::west_opt(STAMP_OFFSET_SECS)
        .map(|o| date.with_timezone(&o).naive_local())
        .unwrap_or_else(|| date.naive_utc())
}

/// "01 de mayo de 2024"
pub fn long_date(date: DateTime<Utc>) -> String {
    let d = chile_day(date);
    format!(
        "{:02} de {} de {}",
        d.day(),
        MONTHS_ES[d.month0() as usize],
        d.year()
    )
}

/// "01/05", used under chart bars.
pub fn short_date(date: DateTime<Utc>) -> String {
    let d = chile_day(date);
    format!("{:02}/{:02}", d.day(), d.month())
}

/// Map a user-provided locale tag to a num-format Locale and decimal separator.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "es" | "es_cl" | "es_es" | "spanish" => (&Locale::es, ','),
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        _ => (&Locale::en, '.'),
    }
}

/// Format `value` with thousands separators and exactly `decimals` decimals.
pub fn amount(value: f64, decimals: usize, locale_tag: &str) -> String {
    if !value.is_finite() {
        return "NA".to_string();
    }
    let (locale, dec_sep) = map_locale(locale_tag);
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let int_fmt = int_part
        .parse::<u64>()
        .map(|n| n.to_formatted_string(locale))
        .unwrap_or_else(|_| int_part.to_string());
    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}{}{}", sign, int_fmt, dec_sep, f),
        None => format!("{}{}", sign, int_fmt),
    }
}

/// "$950,50" style money with the currency unit appended when present.
pub fn money(value: f64, decimals: usize, unit: &str, locale_tag: &str) -> String {
    let n = amount(value, decimals, locale_tag);
    if unit.is_empty() {
        format!("${}", n)
    } else {
        format!("${} {}", n, unit)
    }
}
