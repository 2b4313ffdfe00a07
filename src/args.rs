//! Command-line interface of the `delivery-report` binary.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// delivery-report: cash delivery reports per unit.
///
/// Reads the transactions, manager contacts and exclusion list from the data
/// directory, keeps the cash deliveries of a period, and writes one table per
/// unit plus a ranked general summary. The `export` command writes the
/// filtered rows of selected units instead.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the per-unit tables and the general summary.
    Report(PeriodArgs),
    /// Write the filtered rows of selected units to CSV files.
    Export(ExportArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct Common {
    /// JSON config file. Fields not present keep their defaults.
    #[arg(long, env = "DELIVERY_REPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the input CSV files.
    #[arg(long, env = "DELIVERY_REPORT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory the reports are written to.
    #[arg(long, env = "DELIVERY_REPORT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

impl Common {
    pub fn config(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    pub fn data_dir(&self) -> Option<&PathBuf> {
        self.data_dir.as_ref()
    }

    pub fn output_dir(&self) -> Option<&PathBuf> {
        self.output_dir.as_ref()
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

/// Reporting period. Missing bounds are asked for interactively.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// First day, DD/MM/YYYY.
    #[arg(long)]
    start: Option<String>,

    /// Last day (inclusive), DD/MM/YYYY.
    #[arg(long)]
    end: Option<String>,
}

impl PeriodArgs {
    pub fn new(start: Option<String>, end: Option<String>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ExportArgs {
    #[clap(flatten)]
    period: PeriodArgs,

    /// Units separated by ';', or 'todos'. Asked for interactively if absent.
    #[arg(long)]
    units: Option<String>,
}

impl ExportArgs {
    pub fn new(period: PeriodArgs, units: Option<String>) -> Self {
        Self { period, units }
    }

    pub fn period(&self) -> &PeriodArgs {
        &self.period
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }
}
