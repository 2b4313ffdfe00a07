use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{ExclusionSet, Manager, ManagerDirectory, Transaction};
use crate::util::{normalize_whatsapp, parse_amount};
use csv::{ReaderBuilder, StringRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything read from the data directory for one run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub transactions: Vec<Transaction>,
    pub managers: ManagerDirectory,
    pub exclusions: ExclusionSet,
}

/// Load the three data sources named by `config`.
///
/// The transactions file is mandatory. A missing managers or exclusions file
/// is logged and treated as empty.
pub fn load_dataset(config: &Config) -> Result<Dataset> {
    let transactions = load_transactions(&config.transactions_path(), config)?;
    info!("{} transactions loaded", transactions.len());

    let managers_path = config.managers_path();
    let managers = if managers_path.exists() {
        load_managers(&managers_path, config)?
    } else {
        warn!("{} not found, no manager contacts", managers_path.display());
        ManagerDirectory::default()
    };
    info!("{} managers loaded", managers.len());

    let exclusions_path = config.exclusions_path();
    let exclusions = if exclusions_path.exists() {
        load_exclusions(&exclusions_path)?
    } else {
        warn!("{} not found, nobody excluded", exclusions_path.display());
        ExclusionSet::default()
    };
    info!("{} agents to exclude", exclusions.len());

    Ok(Dataset {
        transactions,
        managers,
        exclusions,
    })
}

/// Maps configured column names to positions in one CSV file.
struct Header {
    file: PathBuf,
    record: StringRecord,
}

impl Header {
    fn position(&self, column: &str) -> Option<usize> {
        self.record.iter().position(|h| h.trim() == column)
    }

    fn require(&self, column: &str) -> Result<usize> {
        self.position(column).ok_or_else(|| Error::MissingColumn {
            file: self.file.clone(),
            column: column.to_string(),
        })
    }
}

fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn required_cell(
    record: &StringRecord,
    idx: usize,
    file: &Path,
    row: usize,
    column: &str,
) -> Result<String> {
    cell(record, idx)
        .map(str::to_string)
        .ok_or_else(|| Error::MissingField {
            file: file.to_path_buf(),
            row,
            column: column.to_string(),
        })
}

/// Read the transactions sheet.
///
/// Column presence is validated once from the header. Per row, unit, agent
/// and amount are required; a missing payment method or operator becomes
/// `None` and an unparseable delivery date is kept as text for the filter.
pub fn load_transactions(path: &Path, config: &Config) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let header = Header {
        file: path.to_path_buf(),
        record: rdr.headers()?.clone(),
    };
    let cols = &config.columns;
    let date_idx = header.require(&cols.delivery_date)?;
    let unit_idx = header.require(&cols.unit)?;
    let agent_idx = header.require(&cols.agent)?;
    let amount_idx = header.require(&cols.amount)?;
    let payment_idx = header.require(&cols.payment_method)?;
    let operator_idx = header.position(&cols.operator);
    if operator_idx.is_none() {
        debug!("{}: no '{}' column", path.display(), cols.operator);
    }

    let mut out = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let raw_amount = required_cell(&record, amount_idx, path, row, &cols.amount)?;
        let amount = parse_amount(&raw_amount).ok_or_else(|| Error::InvalidAmount {
            file: path.to_path_buf(),
            row,
            value: raw_amount.clone(),
        })?;
        out.push(Transaction {
            delivery_date: cell(&record, date_idx).unwrap_or_default().to_string(),
            unit: required_cell(&record, unit_idx, path, row, &cols.unit)?,
            agent: required_cell(&record, agent_idx, path, row, &cols.agent)?,
            amount,
            payment_method: cell(&record, payment_idx).map(str::to_string),
            operator: operator_idx
                .and_then(|idx| cell(&record, idx))
                .map(str::to_string),
        });
    }
    Ok(out)
}

/// Read the manager contacts sheet into a directory keyed by operator.
pub fn load_managers(path: &Path, config: &Config) -> Result<ManagerDirectory> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let header = Header {
        file: path.to_path_buf(),
        record: rdr.headers()?.clone(),
    };
    let cols = &config.manager_columns;
    let operator_idx = header.require(&cols.operator)?;
    let name_idx = header.require(&cols.name)?;
    let unit_idx = header.require(&cols.unit)?;
    let whatsapp_idx = header.require(&cols.whatsapp)?;

    let mut directory = ManagerDirectory::default();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let whatsapp_original = cell(&record, whatsapp_idx).unwrap_or_default().to_string();
        directory.insert(Manager {
            operator: required_cell(&record, operator_idx, path, row, &cols.operator)?,
            name: cell(&record, name_idx).unwrap_or_default().to_string(),
            unit: cell(&record, unit_idx).unwrap_or_default().to_string(),
            whatsapp: normalize_whatsapp(&whatsapp_original),
            whatsapp_original,
        });
    }
    Ok(directory)
}

/// Read the exclusion list: the first column of every row, blanks skipped.
pub fn load_exclusions(path: &Path) -> Result<ExclusionSet> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut names = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if let Some(name) = cell(&record, 0) {
            names.push(name.to_string());
        }
    }
    Ok(names.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestData;

    #[test]
    fn test_load_transactions() {
        let data = TestData::new();
        let path = data.write(
            "transactions.csv",
            "DATA ENTREGA,OPERAÇÃO,Entregador,Fatur.(R$),Pgto.,Operador\n\
             05/01/2026,A,X,\"100,00\",Dinheiro,op1\n\
             31/13/2026,A,Y,50.5,,\n",
        );
        let txs = load_transactions(&path, &Config::default()).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].delivery_date, "05/01/2026");
        assert_eq!(txs[0].amount, 100.0);
        assert_eq!(txs[0].payment_method.as_deref(), Some("Dinheiro"));
        assert_eq!(txs[0].operator.as_deref(), Some("op1"));
        assert_eq!(txs[1].delivery_date, "31/13/2026");
        assert_eq!(txs[1].payment_method, None);
        assert_eq!(txs[1].operator, None);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let data = TestData::new();
        let path = data.write(
            "transactions.csv",
            "DATA ENTREGA,OPERAÇÃO,Fatur.(R$),Pgto.\n05/01/2026,A,10,dinheiro\n",
        );
        let err = load_transactions(&path, &Config::default()).unwrap_err();
        match err {
            Error::MissingColumn { column, .. } => assert_eq!(column, "Entregador"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_cell_is_an_error() {
        let data = TestData::new();
        let path = data.write(
            "transactions.csv",
            "DATA ENTREGA,OPERAÇÃO,Entregador,Fatur.(R$),Pgto.\n\
             05/01/2026,A,X,10,dinheiro\n\
             05/01/2026,,X,10,dinheiro\n",
        );
        let err = load_transactions(&path, &Config::default()).unwrap_err();
        match err {
            Error::MissingField { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "OPERAÇÃO");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_invalid_amount_is_an_error() {
        let data = TestData::new();
        let path = data.write(
            "transactions.csv",
            "DATA ENTREGA,OPERAÇÃO,Entregador,Fatur.(R$),Pgto.\n05/01/2026,A,X,abc,dinheiro\n",
        );
        let err = load_transactions(&path, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount { row: 1, .. }));
    }

    #[test]
    fn test_load_managers_normalizes_phone() {
        let data = TestData::new();
        let path = data.write(
            "managers.csv",
            "operador,NOME DO GERENTE,OPERAÇÃO,WHATSAPP\n\
             Gidalto Curitiba,Gidalto Dos Santos,GRANDE CURITIBA,41 92005-7292\n",
        );
        let managers = load_managers(&path, &Config::default()).unwrap();
        let m = managers.get("Gidalto Curitiba").unwrap();
        assert_eq!(m.whatsapp, "5541920057292");
        assert_eq!(m.whatsapp_original, "41 92005-7292");
        assert_eq!(
            managers.find_by_unit("grande curitiba").map(|m| m.name.as_str()),
            Some("Gidalto Dos Santos")
        );
    }

    #[test]
    fn test_load_exclusions_uses_first_column() {
        let data = TestData::new();
        let path = data.write("exclusions.csv", "Entregador,Motivo\nX,teste\n,\nZ\n");
        let exclusions = load_exclusions(&path).unwrap();
        assert_eq!(exclusions.len(), 2);
        assert!(exclusions.contains("X"));
        assert!(exclusions.contains("Z"));
        assert!(!exclusions.contains("x"));
    }

    #[test]
    fn test_load_dataset_tolerates_missing_side_files() {
        let data = TestData::new();
        data.write(
            "transactions.csv",
            "DATA ENTREGA,OPERAÇÃO,Entregador,Fatur.(R$),Pgto.\n05/01/2026,A,X,10,dinheiro\n",
        );
        let dataset = load_dataset(&data.config()).unwrap();
        assert_eq!(dataset.transactions.len(), 1);
        assert!(dataset.managers.is_empty());
        assert!(dataset.exclusions.is_empty());
    }
}
