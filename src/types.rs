use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tabled::Tabled;

/// Label of the synthetic grand-total row in pivots and in the summary.
pub const TOTAL_ROW: &str = "TOTAL";
/// Label of the synthetic per-agent total column in pivots.
pub const TOTAL_COLUMN: &str = "Total";

/// One row of the transactions sheet as loaded. The delivery date is still
/// text; the filter decides whether it parses.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub delivery_date: String,
    pub unit: String,
    pub agent: String,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub operator: Option<String>,
}

/// A transaction that survived the filter, with its date parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub date: NaiveDate,
    pub unit: String,
    pub agent: String,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub operator: Option<String>,
}

impl Delivery {
    /// Turns the delivery back into a raw transaction, rendering the date with
    /// `date_format`.
    pub fn to_transaction(&self, date_format: &str) -> Transaction {
        Transaction {
            delivery_date: self.date.format(date_format).to_string(),
            unit: self.unit.clone(),
            agent: self.agent.clone(),
            amount: self.amount,
            payment_method: self.payment_method.clone(),
            operator: self.operator.clone(),
        }
    }
}

/// Agent names that never appear in any report. Matching is exact.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    pub fn contains(&self, agent: &str) -> bool {
        self.names.contains(agent)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Row counts observed at each filter step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub total_rows: usize,
    pub after_payment: usize,
    pub invalid_dates: usize,
    pub after_period: usize,
    pub excluded: usize,
    pub kept: usize,
}

impl FilterReport {
    pub fn removed(&self) -> usize {
        self.total_rows - self.kept
    }
}

/// One line of the ranked summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub unit: String,
    pub total: f64,
    /// Set only on the appended grand-total line, so a unit that happens to
    /// be named `TOTAL` is still ranked like any other.
    #[serde(skip)]
    pub is_total: bool,
}

/// Contact of the manager responsible for a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manager {
    pub operator: String,
    pub name: String,
    pub unit: String,
    pub whatsapp: String,
    pub whatsapp_original: String,
}

/// Manager contacts keyed by operator.
#[derive(Debug, Clone, Default)]
pub struct ManagerDirectory {
    by_operator: BTreeMap<String, Manager>,
}

impl ManagerDirectory {
    /// Later rows for the same operator replace earlier ones.
    pub fn insert(&mut self, manager: Manager) {
        self.by_operator.insert(manager.operator.clone(), manager);
    }

    pub fn get(&self, operator: &str) -> Option<&Manager> {
        self.by_operator.get(operator)
    }

    /// First manager (in operator order) whose unit matches, ignoring case.
    pub fn find_by_unit(&self, unit: &str) -> Option<&Manager> {
        let unit = unit.trim().to_uppercase();
        self.by_operator
            .values()
            .find(|m| m.unit.trim().to_uppercase() == unit)
    }

    pub fn len(&self) -> usize {
        self.by_operator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_operator.is_empty()
    }
}

/// Display form of a summary line, as rendered and exported.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SummaryTableRow {
    #[serde(rename = "#")]
    #[tabled(rename = "#")]
    pub position: String,
    #[serde(rename = "Nome da Região")]
    #[tabled(rename = "Nome da Região")]
    pub unit: String,
    #[serde(rename = "Sum of Fatur.(R$)")]
    #[tabled(rename = "Sum of Fatur.(R$)")]
    pub total: String,
}
