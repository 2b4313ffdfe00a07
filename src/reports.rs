use crate::pivot::PivotTable;
use crate::types::{Delivery, SummaryRow, TOTAL_ROW};
use crate::util::format_brl;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::info;

/// One pivot per unit present in `deliveries`, keyed by unit name.
///
/// An empty input yields an empty map.
pub fn aggregate_by_unit(deliveries: &[Delivery]) -> BTreeMap<String, PivotTable> {
    let mut by_unit: BTreeMap<&str, Vec<&Delivery>> = BTreeMap::new();
    for d in deliveries {
        by_unit.entry(d.unit.as_str()).or_default().push(d);
    }

    by_unit
        .into_iter()
        .map(|(unit, rows)| {
            let table = PivotTable::build(unit, rows);
            info!("{}: {}", unit, format_brl(table.grand_total()));
            (unit.to_string(), table)
        })
        .collect()
}

/// Deliveries of one unit, in input order.
pub fn deliveries_for_unit<'a>(deliveries: &'a [Delivery], unit: &str) -> Vec<&'a Delivery> {
    deliveries.iter().filter(|d| d.unit == unit).collect()
}

/// Rank units by grand total, highest first, and append a TOTAL row.
///
/// Ties keep the map's order (unit name). With no units the result is empty:
/// no TOTAL row is emitted.
pub fn summarize(tables: &BTreeMap<String, PivotTable>) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = tables
        .iter()
        .map(|(unit, table)| SummaryRow {
            unit: unit.clone(),
            total: table.grand_total(),
            is_total: false,
        })
        .collect();
    if rows.is_empty() {
        return rows;
    }

    // `sort_by` is stable.
    rows.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    let grand_total: f64 = rows.iter().map(|r| r.total).sum();
    rows.push(SummaryRow {
        unit: TOTAL_ROW.to_string(),
        total: grand_total,
        is_total: true,
    });
    rows
}
