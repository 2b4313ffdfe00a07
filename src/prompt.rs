// Interactive input: the reporting period and the units to export.
use crate::error::{Error, Result};
use crate::filter::Period;
use crate::util::parse_date_safe;
use std::io::{self, BufRead, Write};

/// Keyword that selects every unit.
pub const ALL_UNITS: &str = "todos";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitSelectionError {
    #[error("type at least one unit or 'todos'")]
    Empty,
    #[error("units not found: {}", .0.join(", "))]
    Unknown(Vec<String>),
}

/// Print `prompt` and read one trimmed line from `input`. `None` once the
/// input is closed.
pub fn read_line_from<R: BufRead>(input: &mut R, prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

fn closed(prompt: &str) -> Error {
    Error::InputClosed {
        prompt: prompt.to_string(),
    }
}

/// Ask for a date until one parses with `format`.
pub fn prompt_date_from<R: BufRead>(input: &mut R, label: &str, format: &str) -> Result<String> {
    loop {
        let line = read_line_from(input, &format!("{} (DD/MM/YYYY): ", label))?
            .ok_or_else(|| closed(label))?;
        if parse_date_safe(&line, format).is_some() {
            return Ok(line);
        }
        println!("Invalid date! Use the DD/MM/YYYY format (e.g. 05/01/2026)");
    }
}

/// Resolve the period from the given bounds, prompting for any missing one.
pub fn resolve_period(start: Option<&str>, end: Option<&str>, format: &str) -> Result<Period> {
    resolve_period_from(&mut io::stdin().lock(), start, end, format)
}

pub fn resolve_period_from<R: BufRead>(
    input: &mut R,
    start: Option<&str>,
    end: Option<&str>,
    format: &str,
) -> Result<Period> {
    let start = match start {
        Some(s) => s.to_string(),
        None => prompt_date_from(input, "Start date", format)?,
    };
    let end = match end {
        Some(s) => s.to_string(),
        None => prompt_date_from(input, "End date", format)?,
    };
    Period::parse(&start, &end, format)
}

/// Interpret a unit selection: `todos`, or names separated by `;`.
///
/// Names are matched case-insensitively and returned as they appear in
/// `available`, without duplicates, in the order typed.
pub fn parse_unit_selection(
    input: &str,
    available: &[String],
) -> std::result::Result<Vec<String>, UnitSelectionError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitSelectionError::Empty);
    }
    if input.eq_ignore_ascii_case(ALL_UNITS) {
        return Ok(available.to_vec());
    }

    let mut selected: Vec<String> = Vec::new();
    let mut unknown = Vec::new();
    for wanted in input.split(';').map(|s| s.trim().to_uppercase()) {
        if wanted.is_empty() {
            continue;
        }
        match available.iter().find(|u| u.to_uppercase() == wanted) {
            Some(unit) if !selected.contains(unit) => selected.push(unit.clone()),
            Some(_) => {}
            None => unknown.push(wanted),
        }
    }
    if !unknown.is_empty() {
        return Err(UnitSelectionError::Unknown(unknown));
    }
    if selected.is_empty() {
        return Err(UnitSelectionError::Empty);
    }
    Ok(selected)
}

/// List `available` and ask until the selection is valid.
pub fn prompt_units_from<R: BufRead>(input: &mut R, available: &[String]) -> Result<Vec<String>> {
    println!("Available units:\n");
    for (idx, unit) in available.iter().enumerate() {
        println!("   {}. {}", idx + 1, unit);
    }
    println!("\n   Total: {} units\n", available.len());
    println!("Type the units separated by ';' (e.g. grande fortaleza;grande natal)");
    println!("or '{}' for all of them.\n", ALL_UNITS);
    loop {
        let line = read_line_from(input, "Units: ")?.ok_or_else(|| closed("units"))?;
        match parse_unit_selection(&line, available) {
            Ok(units) => return Ok(units),
            Err(e) => println!("{}\n", e),
        }
    }
}

pub fn prompt_units(available: &[String]) -> Result<Vec<String>> {
    prompt_units_from(&mut io::stdin().lock(), available)
}
