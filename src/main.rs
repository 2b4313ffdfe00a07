// Entry point of the `delivery-report` binary.
//
// - `report` loads the data, asks for the period if needed, and writes one
//   table per unit plus the ranked summary.
// - `export` writes the filtered rows of the selected units as CSV.
use clap::Parser;
use delivery_report::args::{Args, Command, Common};
use delivery_report::{commands, Config};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn main_inner(args: Args) -> anyhow::Result<()> {
    trace!("{args:?}");
    let config = build_config(args.common())?;
    debug!("{config:?}");

    match args.command() {
        Command::Report(period) => {
            let outcome = commands::report(&config, period)?;
            debug!(
                "{} units, {} files, {} of {} rows kept",
                outcome.units,
                outcome.files.len(),
                outcome.filter.kept,
                outcome.filter.total_rows
            );
        }
        Command::Export(export) => {
            let exports = commands::export(&config, export)?;
            debug!("{} units exported", exports.len());
        }
    }
    Ok(())
}

/// Config file (if any), then command-line directory overrides.
fn build_config(common: &Common) -> anyhow::Result<Config> {
    let mut config = match common.config() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = common.data_dir() {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = common.output_dir() {
        config.export_dir = dir.join("planilhas");
        config.output_dir = dir.clone();
    }
    Ok(config)
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        // RUST_LOG exists; use it.
        Some(_) => EnvFilter::from_default_env(),
        // Otherwise only this crate logs (library and binary share the name).
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
