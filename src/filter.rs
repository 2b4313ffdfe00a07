use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{Delivery, ExclusionSet, FilterReport, Transaction};
use crate::util::parse_date_safe;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Inclusive reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both bounds with `format`. An inverted period is accepted; it
    /// simply matches nothing.
    pub fn parse(start: &str, end: &str, format: &str) -> Result<Self> {
        let parse = |s: &str| {
            parse_date_safe(s, format).ok_or_else(|| Error::InvalidDate {
                value: s.to_string(),
            })
        };
        Ok(Self::new(parse(start)?, parse(end)?))
    }

    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `05/01/2026 a 07/01/2026`
    pub fn label(&self, format: &str) -> String {
        format!("{} a {}", self.start.format(format), self.end.format(format))
    }
}

/// Keep the cash deliveries of `period` whose agent is not excluded.
///
/// Steps run in order: payment method, date parsing, period, exclusions.
/// Rows with an unparseable delivery date are dropped and counted in
/// `FilterReport::invalid_dates`. Input order is preserved.
pub fn filter_transactions(
    transactions: &[Transaction],
    period: &Period,
    exclusions: &ExclusionSet,
    config: &Config,
) -> (Vec<Delivery>, FilterReport) {
    let keyword = config.payment_keyword.to_lowercase();
    let mut report = FilterReport {
        total_rows: transactions.len(),
        ..FilterReport::default()
    };

    let cash: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| {
            t.payment_method
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(&keyword))
        })
        .collect();
    report.after_payment = cash.len();
    info!("After '{}' filter: {} rows", config.payment_keyword, cash.len());

    let dated: Vec<(NaiveDate, &Transaction)> = cash
        .into_iter()
        .filter_map(|t| parse_date_safe(&t.delivery_date, &config.date_format).map(|d| (d, t)))
        .collect();
    report.invalid_dates = report.after_payment - dated.len();
    if report.invalid_dates > 0 {
        warn!("{} rows with an invalid date removed", report.invalid_dates);
    }

    if period.is_inverted() {
        warn!(
            "Period ends before it starts ({}), no row can match",
            period.label(&config.date_format)
        );
    }
    let in_period: Vec<(NaiveDate, &Transaction)> = dated
        .into_iter()
        .filter(|(d, _)| period.contains(*d))
        .collect();
    report.after_period = in_period.len();
    info!("After period filter: {} rows", in_period.len());

    let kept: Vec<Delivery> = in_period
        .into_iter()
        .filter(|(_, t)| !exclusions.contains(&t.agent))
        .map(|(date, t)| Delivery {
            date,
            unit: t.unit.clone(),
            agent: t.agent.clone(),
            amount: t.amount,
            payment_method: t.payment_method.clone(),
            operator: t.operator.clone(),
        })
        .collect();
    report.kept = kept.len();
    report.excluded = report.after_period - report.kept;
    info!(
        "After exclusions: {} rows ({} excluded), {} of {} removed in total",
        report.kept,
        report.excluded,
        report.removed(),
        report.total_rows
    );

    (kept, report)
}
