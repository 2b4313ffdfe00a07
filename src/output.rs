// Rendering and file output.
//
// Report tables are rendered as text with `tabled` (one file per unit plus
// the general summary), each alongside a CSV with the raw numbers. The
// export path writes the filtered rows of a unit back out as CSV.
use crate::config::Config;
use crate::error::Result;
use crate::filter::Period;
use crate::pivot::PivotTable;
use crate::reports::deliveries_for_unit;
use crate::types::{Delivery, SummaryRow, SummaryTableRow};
use crate::util::{format_brl, slugify};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::{settings::Style, Table, Tabled};
use tracing::{debug, warn};

/// Key of the summary entry in the map returned by `write_reports`.
pub const SUMMARY_KEY: &str = "RESUMO_GERAL";
const SUMMARY_FILE: &str = "resumo_geral";
const AGENT_HEADER: &str = "Entregador";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Text rendering of one unit's pivot, with title and period.
pub fn render_pivot(table: &PivotTable, period_label: &str, date_format: &str) -> String {
    let mut builder = Builder::default();
    let mut header = vec![AGENT_HEADER.to_string()];
    header.extend(table.header(date_format));
    builder.push_record(header);
    for row in table.rows() {
        let mut record = vec![row.label];
        record.extend(row.values.iter().map(|v| format_brl(*v)));
        record.push(format_brl(row.total));
        builder.push_record(record);
    }
    let rendered = builder.build().with(Style::modern()).to_string();
    format!(
        "RELATÓRIO - {}\nPeríodo: {}\n\n{}\n",
        table.unit(),
        period_label,
        rendered
    )
}

/// Display rows of the summary: 1-based position, blank for TOTAL.
pub fn summary_table_rows(summary: &[SummaryRow]) -> Vec<SummaryTableRow> {
    summary
        .iter()
        .enumerate()
        .map(|(idx, row)| SummaryTableRow {
            position: if row.is_total {
                String::new()
            } else {
                (idx + 1).to_string()
            },
            unit: row.unit.clone(),
            total: format_brl(row.total),
        })
        .collect()
}

pub fn render_summary(summary: &[SummaryRow], period_label: &str) -> String {
    let table = Table::new(summary_table_rows(summary))
        .with(Style::modern())
        .to_string();
    format!(
        "RESUMO GERAL - TODAS AS OPERAÇÕES\nPeríodo: {}\n\n{}\n",
        period_label, table
    )
}

/// Raw pivot numbers: agent column, one column per date, then Total.
pub fn write_pivot_csv(path: &Path, table: &PivotTable, date_format: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec![AGENT_HEADER.to_string()];
    header.extend(table.header(date_format));
    wtr.write_record(&header)?;
    for row in table.rows() {
        let mut record = vec![row.label];
        record.extend(row.values.iter().map(|v| format!("{:.2}", v)));
        record.push(format!("{:.2}", row.total));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every unit report and the summary into `config.output_dir`.
///
/// Returns the text file written for each unit, plus the summary under
/// `SUMMARY_KEY`.
pub fn write_reports(
    tables: &BTreeMap<String, PivotTable>,
    summary: &[SummaryRow],
    period: &Period,
    config: &Config,
) -> Result<BTreeMap<String, PathBuf>> {
    std::fs::create_dir_all(&config.output_dir)?;
    let period_label = period.label(&config.date_format);
    let mut written = BTreeMap::new();

    for (unit, table) in tables {
        let slug = slugify(unit);
        let txt = config.output_dir.join(format!("{}.txt", slug));
        std::fs::write(&txt, render_pivot(table, &period_label, &config.date_format))?;
        write_pivot_csv(
            &config.output_dir.join(format!("{}.csv", slug)),
            table,
            &config.date_format,
        )?;
        debug!("{} -> {}", unit, txt.display());
        written.insert(unit.clone(), txt);
    }

    let txt = config.output_dir.join(format!("{}.txt", SUMMARY_FILE));
    std::fs::write(&txt, render_summary(summary, &period_label))?;
    write_csv(
        &config.output_dir.join(format!("{}.csv", SUMMARY_FILE)),
        &summary_table_rows(summary),
    )?;
    written.insert(SUMMARY_KEY.to_string(), txt);
    Ok(written)
}

/// Result of exporting one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitExport {
    pub unit: String,
    pub path: PathBuf,
    pub rows: usize,
    pub total: f64,
}

/// `grande_natal_01-01-2026_a_31-01-2026.csv`
pub fn export_file_name(unit: &str, period: &Period) -> String {
    format!(
        "{}_{}_a_{}.csv",
        slugify(unit),
        period.start.format("%d-%m-%Y"),
        period.end.format("%d-%m-%Y")
    )
}

/// Write the filtered rows of `unit`, oldest first, to `config.export_dir`.
///
/// Returns `None` (and writes nothing) when the unit has no rows.
pub fn export_unit(
    deliveries: &[Delivery],
    unit: &str,
    period: &Period,
    config: &Config,
) -> Result<Option<UnitExport>> {
    let mut rows = deliveries_for_unit(deliveries, unit);
    if rows.is_empty() {
        warn!("{}: no data, skipping", unit);
        return Ok(None);
    }
    rows.sort_by_key(|d| d.date);

    std::fs::create_dir_all(&config.export_dir)?;
    let path = config.export_dir.join(export_file_name(unit, period));
    let cols = &config.columns;
    let mut wtr = csv::Writer::from_path(&path)?;
    wtr.write_record([
        &cols.delivery_date,
        &cols.unit,
        &cols.agent,
        &cols.amount,
        &cols.payment_method,
        &cols.operator,
    ])?;
    for d in &rows {
        let t = d.to_transaction(&config.date_format);
        wtr.write_record([
            t.delivery_date,
            t.unit,
            t.agent,
            format!("{:.2}", t.amount),
            t.payment_method.unwrap_or_default(),
            t.operator.unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;

    Ok(Some(UnitExport {
        unit: unit.to_string(),
        path,
        rows: rows.len(),
        total: rows.iter().map(|d| d.amount).sum(),
    }))
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
