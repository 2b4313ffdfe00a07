// Dense agent × date table of one unit.
//
// The table is built in explicit steps: sum amounts per (agent, date), collect
// the sorted agent and date universes, allocate a zero-filled matrix over
// them, fill it from the sums, then derive the Total column and TOTAL row.
use crate::types::{Delivery, TOTAL_COLUMN, TOTAL_ROW};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// One rendered line of a pivot: an agent or the synthetic TOTAL row.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub label: String,
    /// One value per date column, in `PivotTable::dates` order.
    pub values: Vec<f64>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    unit: String,
    agents: Vec<String>,
    dates: Vec<NaiveDate>,
    /// `cells[agent][date]`, indices into `agents` and `dates`.
    cells: Vec<Vec<f64>>,
    row_totals: Vec<f64>,
    column_totals: Vec<f64>,
    grand_total: f64,
}

impl PivotTable {
    /// Build the table for `unit` from its deliveries. Callers pass only the
    /// deliveries of that unit.
    pub fn build<'a, I>(unit: &str, deliveries: I) -> Self
    where
        I: IntoIterator<Item = &'a Delivery>,
    {
        // Same agent on the same day collapses into one summed cell.
        let mut sums: BTreeMap<(&str, NaiveDate), f64> = BTreeMap::new();
        for d in deliveries {
            *sums.entry((d.agent.as_str(), d.date)).or_insert(0.0) += d.amount;
        }

        let agents: Vec<String> = sums
            .keys()
            .map(|(agent, _)| *agent)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let dates: Vec<NaiveDate> = sums
            .keys()
            .map(|(_, date)| *date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = vec![vec![0.0; dates.len()]; agents.len()];
        for ((agent, date), amount) in &sums {
            if let (Ok(r), Ok(c)) = (
                agents.binary_search_by(|a| a.as_str().cmp(agent)),
                dates.binary_search(date),
            ) {
                cells[r][c] = *amount;
            }
        }

        let row_totals: Vec<f64> = cells.iter().map(|row| row.iter().sum()).collect();
        let column_totals: Vec<f64> = (0..dates.len())
            .map(|c| cells.iter().map(|row| row[c]).sum())
            .collect();
        let grand_total = row_totals.iter().sum();

        Self {
            unit: unit.to_string(),
            agents,
            dates,
            cells,
            row_totals,
            column_totals,
            grand_total,
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Agents in ascending order, without the TOTAL row.
    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    /// Dates in ascending order, without the Total column.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Value for an (agent, date) pair of the table's universe. Pairs with no
    /// delivery are `Some(0.0)`; `None` means the agent or date is not part of
    /// this table.
    pub fn cell(&self, agent: &str, date: NaiveDate) -> Option<f64> {
        let r = self.agent_index(agent)?;
        let c = self.dates.binary_search(&date).ok()?;
        Some(self.cells[r][c])
    }

    pub fn row_total(&self, agent: &str) -> Option<f64> {
        self.agent_index(agent).map(|r| self.row_totals[r])
    }

    pub fn column_total(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|c| self.column_totals[c])
    }

    /// The TOTAL row / Total column cell.
    pub fn grand_total(&self) -> f64 {
        self.grand_total
    }

    /// Column labels after the agent column: formatted dates, then `Total`.
    pub fn header(&self, date_format: &str) -> Vec<String> {
        self.dates
            .iter()
            .map(|d| d.format(date_format).to_string())
            .chain(std::iter::once(TOTAL_COLUMN.to_string()))
            .collect()
    }

    /// All rows in display order: agents, then TOTAL.
    pub fn rows(&self) -> Vec<PivotRow> {
        self.agents
            .iter()
            .zip(self.cells.iter().zip(&self.row_totals))
            .map(|(agent, (values, total))| PivotRow {
                label: agent.clone(),
                values: values.clone(),
                total: *total,
            })
            .chain(std::iter::once(PivotRow {
                label: TOTAL_ROW.to_string(),
                values: self.column_totals.clone(),
                total: self.grand_total,
            }))
            .collect()
    }

    fn agent_index(&self, agent: &str) -> Option<usize> {
        self.agents.binary_search_by(|a| a.as_str().cmp(agent)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn delivery(d: u32, agent: &str, amount: f64) -> Delivery {
        Delivery {
            date: day(d),
            unit: "A".to_string(),
            agent: agent.to_string(),
            amount,
            payment_method: Some("dinheiro".to_string()),
            operator: None,
        }
    }

    fn sample() -> PivotTable {
        let ds = vec![
            delivery(7, "Maria", 600.0),
            delivery(5, "João", 1000.0),
            delivery(6, "João", 1500.0),
            delivery(7, "João", 2000.0),
            delivery(5, "Maria", 500.0),
            delivery(5, "Maria", 0.25),
        ];
        PivotTable::build("A", &ds)
    }

    #[test]
    fn test_same_agent_same_day_is_summed() {
        let ds = vec![delivery(5, "X", 100.0), delivery(5, "X", 50.0)];
        let t = PivotTable::build("A", &ds);
        assert_eq!(t.agents(), ["X".to_string()]);
        assert_eq!(t.dates(), [day(5)]);
        assert_eq!(t.cell("X", day(5)), Some(150.0));
        assert_eq!(t.row_total("X"), Some(150.0));
        assert_eq!(t.column_total(day(5)), Some(150.0));
        assert_eq!(t.grand_total(), 150.0);
    }

    #[test]
    fn test_rows_and_columns_are_sorted() {
        let t = sample();
        assert_eq!(t.agents(), ["João".to_string(), "Maria".to_string()]);
        assert_eq!(t.dates(), [day(5), day(6), day(7)]);
    }

    #[test]
    fn test_table_is_dense_with_zero_fill() {
        let t = sample();
        for agent in t.agents() {
            for date in t.dates() {
                assert!(t.cell(agent, *date).is_some());
            }
        }
        assert_eq!(t.cell("Maria", day(6)), Some(0.0));
        assert_eq!(t.cell("Maria", day(8)), None);
        assert_eq!(t.cell("Nobody", day(5)), None);
    }

    #[test]
    fn test_totals_are_consistent() {
        let t = sample();
        for agent in t.agents() {
            let sum: f64 = t.dates().iter().filter_map(|d| t.cell(agent, *d)).sum();
            assert!((t.row_total(agent).unwrap() - sum).abs() < EPS);
        }
        for date in t.dates() {
            let sum: f64 = t.agents().iter().filter_map(|a| t.cell(a, *date)).sum();
            assert!((t.column_total(*date).unwrap() - sum).abs() < EPS);
        }
        let by_columns: f64 = t.dates().iter().filter_map(|d| t.column_total(*d)).sum();
        assert!((t.grand_total() - by_columns).abs() < EPS);
        assert!((t.grand_total() - 5600.25).abs() < EPS);
    }

    #[test]
    fn test_rows_end_with_total() {
        let t = sample();
        let rows = t.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].label, "João");
        assert_eq!(rows[0].values, vec![1000.0, 1500.0, 2000.0]);
        assert_eq!(rows[0].total, 4500.0);
        assert_eq!(rows[1].values, vec![500.25, 0.0, 600.0]);
        let last = rows.last().unwrap();
        assert_eq!(last.label, TOTAL_ROW);
        assert_eq!(last.values, vec![1500.25, 1500.0, 2600.0]);
        assert!((last.total - 5600.25).abs() < EPS);
    }

    #[test]
    fn test_header_ends_with_total() {
        let t = sample();
        assert_eq!(
            t.header("%d/%m/%Y"),
            vec!["05/01/2026", "06/01/2026", "07/01/2026", TOTAL_COLUMN]
        );
    }

    #[test]
    fn test_empty_input_gives_total_only() {
        let t = PivotTable::build("A", &Vec::<Delivery>::new());
        assert!(t.agents().is_empty());
        let rows = t.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total, 0.0);
    }
}
