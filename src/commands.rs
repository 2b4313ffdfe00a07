// Command handlers: load, filter, aggregate and write, printing progress for
// the operator on stdout while logs go to stderr.
use crate::args::{ExportArgs, PeriodArgs};
use crate::config::Config;
use crate::filter::{filter_transactions, Period};
use crate::loader::{load_dataset, Dataset};
use crate::output::{export_unit, preview_table_rows, summary_table_rows, write_reports, UnitExport};
use crate::prompt::{parse_unit_selection, prompt_units, resolve_period};
use crate::reports::{aggregate_by_unit, summarize};
use crate::types::{Delivery, FilterReport, Manager};
use crate::util::{format_brl, format_int};
use anyhow::Context;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Outcome of `report`, for callers that want more than the printout.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub filter: FilterReport,
    pub units: usize,
    pub grand_total: f64,
    pub files: Vec<std::path::PathBuf>,
}

pub fn report(config: &Config, args: &PeriodArgs) -> anyhow::Result<ReportOutcome> {
    println!("Step 1/5: loading data from {}", config.data_dir.display());
    let dataset = load_dataset(config)
        .with_context(|| format!("failed to load data from {}", config.data_dir.display()))?;

    println!("Step 2/5: reporting period");
    let period = choose_period(config, args)?;

    println!("Step 3/5: filtering");
    let (deliveries, filter) = run_filter(&dataset, &period, config);
    if deliveries.is_empty() {
        print_no_data();
        return Ok(ReportOutcome {
            filter,
            units: 0,
            grand_total: 0.0,
            files: Vec::new(),
        });
    }

    println!("Step 4/5: grouping by unit");
    let tables = aggregate_by_unit(&deliveries);
    let summary = summarize(&tables);
    let grand_total = summary.last().map(|r| r.total).unwrap_or_default();
    println!("   {} units, grand total {}\n", tables.len(), format_brl(grand_total));
    preview_table_rows(&summary_table_rows(&summary), summary.len());

    println!("Step 5/5: writing reports to {}", config.output_dir.display());
    let written = write_reports(&tables, &summary, &period, config)
        .with_context(|| format!("failed to write reports to {}", config.output_dir.display()))?;
    info!("{} report files written", written.len());

    println!("\nGenerated files:");
    for path in written.values() {
        println!("   • {}", path.display());
    }

    if let Some((unit, table)) = tables.iter().next() {
        if let Some(manager) = dataset.managers.find_by_unit(unit) {
            let label = period.label(&config.date_format);
            println!("\nSample message:\n---");
            println!("{}", manager_message(manager, unit, &label, table.grand_total()));
            println!("---");
        }
    }

    Ok(ReportOutcome {
        filter,
        units: tables.len(),
        grand_total,
        files: written.into_values().collect(),
    })
}

pub fn export(config: &Config, args: &ExportArgs) -> anyhow::Result<Vec<UnitExport>> {
    let dataset = load_dataset(config)
        .with_context(|| format!("failed to load data from {}", config.data_dir.display()))?;
    let period = choose_period(config, args.period())?;
    let (deliveries, _) = run_filter(&dataset, &period, config);
    if deliveries.is_empty() {
        print_no_data();
        return Ok(Vec::new());
    }

    let available = units_of(&deliveries);
    let selected = match args.units() {
        Some(input) => parse_unit_selection(input, &available)?,
        None => prompt_units(&available)?,
    };

    let mut exports = Vec::new();
    for unit in &selected {
        if let Some(export) = export_unit(&deliveries, unit, &period, config)
            .with_context(|| format!("failed to export {}", unit))?
        {
            println!(
                "   {}: {} rows | {}",
                export.unit,
                format_int(export.rows),
                format_brl(export.total)
            );
            exports.push(export);
        }
    }
    println!(
        "\n{} files written to {}",
        exports.len(),
        config.export_dir.display()
    );
    Ok(exports)
}

/// Message to send a manager along with the unit's report.
pub fn manager_message(manager: &Manager, unit: &str, period_label: &str, total: f64) -> String {
    format!(
        "Olá, {}!\n\n\
         Segue o relatório da operação {}\n\
         referente ao período de {}.\n\n\
         Valor total para devolução: {}\n\n\
         Por favor, confirme o recebimento.",
        manager.name,
        unit,
        period_label,
        format_brl(total)
    )
}

/// Distinct units, sorted.
pub fn units_of(deliveries: &[Delivery]) -> Vec<String> {
    deliveries
        .iter()
        .map(|d| d.unit.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn choose_period(config: &Config, args: &PeriodArgs) -> anyhow::Result<Period> {
    let period = resolve_period(args.start(), args.end(), &config.date_format)?;
    let label = period.label(&config.date_format);
    if period.is_inverted() {
        println!("\nWARNING: the end date is before the start date ({}). Continuing anyway.\n", label);
    } else {
        println!("   Period: {}", label);
    }
    Ok(period)
}

fn run_filter(dataset: &Dataset, period: &Period, config: &Config) -> (Vec<Delivery>, FilterReport) {
    let (deliveries, report) =
        filter_transactions(&dataset.transactions, period, &dataset.exclusions, config);
    println!(
        "   {} of {} rows kept ({} cash, {} invalid dates, {} in period, {} excluded)",
        format_int(report.kept),
        format_int(report.total_rows),
        format_int(report.after_payment),
        format_int(report.invalid_dates),
        format_int(report.after_period),
        format_int(report.excluded)
    );
    (deliveries, report)
}

fn print_no_data() {
    warn!("No rows left after filtering");
    println!("\nNO DATA FOUND!");
    println!("   Possible causes:");
    println!("   • no cash deliveries in the period");
    println!("   • every date was filtered out");
    println!("   • every agent was excluded");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestData;

    const TRANSACTIONS: &str = "DATA ENTREGA,OPERAÇÃO,Entregador,Fatur.(R$),Pgto.,Operador\n\
        05/01/2026,GRANDE NATAL,Caio,\"900,00\",Dinheiro,op2\n\
        06/01/2026,GRANDE BELÉM,Ana,\"1.234,50\",dinheiro,op1\n\
        06/01/2026,GRANDE BELÉM,Bia,50,PIX,op1\n\
        07/01/2026,GRANDE NATAL,Zé,10,dinheiro,op2\n\
        31/13/2026,GRANDE NATAL,Caio,77,dinheiro,op2\n";

    fn data() -> TestData {
        let data = TestData::new();
        data.write("transactions.csv", TRANSACTIONS);
        data.write(
            "managers.csv",
            "operador,NOME DO GERENTE,OPERAÇÃO,WHATSAPP\nop1,Rita,GRANDE BELÉM,91 8536-3030\n",
        );
        data.write("exclusions.csv", "Entregador\nZé\n");
        data
    }

    fn january() -> PeriodArgs {
        PeriodArgs::new(Some("01/01/2026".to_string()), Some("31/01/2026".to_string()))
    }

    #[test]
    fn test_report_end_to_end() {
        let data = data();
        let config = data.config();
        let outcome = report(&config, &january()).unwrap();
        assert_eq!(outcome.filter.total_rows, 5);
        assert_eq!(outcome.filter.invalid_dates, 1);
        assert_eq!(outcome.filter.excluded, 1);
        assert_eq!(outcome.filter.kept, 2);
        assert_eq!(outcome.units, 2);
        assert!((outcome.grand_total - 2134.5).abs() < 1e-6);
        assert_eq!(outcome.files.len(), 3);
        assert!(config.output_dir.join("resumo_geral.txt").exists());
        assert!(config.output_dir.join("grande_natal.txt").exists());
    }

    #[test]
    fn test_report_with_empty_period_writes_nothing() {
        let data = data();
        let config = data.config();
        let args = PeriodArgs::new(Some("31/01/2026".to_string()), Some("01/01/2026".to_string()));
        let outcome = report(&config, &args).unwrap();
        assert_eq!(outcome.units, 0);
        assert!(outcome.files.is_empty());
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn test_report_fails_without_transactions() {
        let data = TestData::new();
        assert!(report(&data.config(), &january()).is_err());
    }

    #[test]
    fn test_export_selected_units() {
        let data = data();
        let config = data.config();
        let args = ExportArgs::new(january(), Some("grande natal".to_string()));
        let exports = export(&config, &args).unwrap();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].unit, "GRANDE NATAL");
        assert_eq!(exports[0].rows, 1);
        assert!(exports[0].path.exists());
    }

    #[test]
    fn test_export_rejects_unknown_unit() {
        let data = data();
        let args = ExportArgs::new(january(), Some("recife".to_string()));
        assert!(export(&data.config(), &args).is_err());
    }

    #[test]
    fn test_manager_message() {
        let manager = Manager {
            operator: "op1".to_string(),
            name: "Rita".to_string(),
            unit: "GRANDE BELÉM".to_string(),
            whatsapp: "559185363030".to_string(),
            whatsapp_original: "91 8536-3030".to_string(),
        };
        let msg = manager_message(&manager, "GRANDE BELÉM", "01/01/2026 a 31/01/2026", 1234.5);
        assert!(msg.starts_with("Olá, Rita!"));
        assert!(msg.contains("operação GRANDE BELÉM"));
        assert!(msg.contains("Valor total para devolução: R$ 1.234,50"));
    }
}
