//! Cash delivery reports.
//!
//! Transactions are filtered (cash only, reporting period, excluded agents),
//! pivoted per unit into agent × date tables with totals, and ranked in a
//! general summary. See `filter`, `pivot` and `reports` for the pipeline;
//! the remaining modules load inputs and write outputs.

pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod pivot;
pub mod prompt;
pub mod reports;
pub mod types;
pub mod util;


pub use config::Config;
pub use error::{Error, Result};
