// Utility helpers for parsing and formatting.
//
// This module centralizes the "dirty" text handling (dates typed as
// DD/MM/YYYY, amounts exported as `R$ 1.234,56`, phone numbers with
// punctuation) so the stages can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a delivery date written with `format` (normally `%d/%m/%Y`).
///
/// - Trims whitespace.
/// - Ignores a trailing time component (`05/01/2026 00:00:00`), which some
///   spreadsheet exports add.
/// - Returns `None` for anything that is not a real calendar date, e.g.
///   `31/13/2026`.
pub fn parse_date_safe(s: &str, format: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let day = s.split_whitespace().next()?;
    NaiveDate::parse_from_str(day, format).ok()
}

/// Parse a monetary amount as found in the sheet.
///
/// Accepts an optional `R$` prefix and both `1.234,56` (Brazilian) and
/// `1234.56` / `1,234.56` (plain) notations. The last of `,` or `.` is taken
/// as the decimal separator when both are present; a lone `,` is decimal.
/// Dots alone are thousands separators when every group after the first has
/// exactly three digits (`1.234`, `12.345.678`); otherwise a single dot is
/// decimal (`150.5`, `0.125`).
pub fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim().trim_start_matches("R$").trim();
    if s.is_empty() || s.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(c), Some(d)) if c > d => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        (None, Some(_)) if is_dot_grouped(&s) => s.replace('.', ""),
        _ => s,
    };
    normalized.parse::<f64>().ok()
}

fn is_dot_grouped(s: &str) -> bool {
    let mut groups = s.trim_start_matches('-').split('.');
    let first = groups.next().unwrap_or_default();
    let digits = |g: &str| !g.is_empty() && g.chars().all(|c| c.is_ascii_digit());
    digits(first)
        && first.len() <= 3
        && first != "0"
        && groups.all(|g| g.len() == 3 && digits(g))
}

/// Format a value as Brazilian currency: `R$ 1.234,56`.
pub fn format_brl(n: f64) -> String {
    let neg = n < 0.0 && format!("{:.2}", n.abs()) != "0.00";
    let s = format!("{:.2}", n.abs());
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));
    let int_val: i64 = int_part.parse().unwrap_or(0);
    // `en` groups with commas; swap them for the Brazilian dot.
    let grouped = int_val.to_formatted_string(&Locale::en).replace(',', ".");
    if neg {
        format!("-R$ {},{}", grouped, frac_part)
    } else {
        format!("R$ {},{}", grouped, frac_part)
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Normalize a WhatsApp number to `55DDNNNNNNNNN`: digits only, with the
/// Brazilian country code prepended when missing.
pub fn normalize_whatsapp(number: &str) -> String {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.starts_with("55") {
        digits
    } else {
        format!("55{}", digits)
    }
}

/// File-name friendly form of a unit name: `GRANDE BELÉM` -> `grande_belem`.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            'ã' | 'á' | 'â' | 'à' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            '/' | '\\' => '-',
            other => other,
        })
        .collect()
}
