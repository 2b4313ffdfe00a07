// Run configuration.
//
// Everything the stages need to know about the input layout (column names,
// the payment keyword, the date format) and where files live. A `Config` is
// built once in `main` and handed to each stage by reference.
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Column names of the transactions sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionColumns {
    pub delivery_date: String,
    pub unit: String,
    pub agent: String,
    pub amount: String,
    pub payment_method: String,
    pub operator: String,
}

impl Default for TransactionColumns {
    fn default() -> Self {
        Self {
            delivery_date: "DATA ENTREGA".to_string(),
            unit: "OPERAÇÃO".to_string(),
            agent: "Entregador".to_string(),
            amount: "Fatur.(R$)".to_string(),
            payment_method: "Pgto.".to_string(),
            operator: "Operador".to_string(),
        }
    }
}

/// Column names of the manager contacts sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerColumns {
    pub operator: String,
    pub name: String,
    pub unit: String,
    pub whatsapp: String,
}

impl Default for ManagerColumns {
    fn default() -> Self {
        Self {
            operator: "operador".to_string(),
            name: "NOME DO GERENTE".to_string(),
            unit: "OPERAÇÃO".to_string(),
            whatsapp: "WHATSAPP".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub columns: TransactionColumns,
    pub manager_columns: ManagerColumns,
    /// Case-folded substring a payment method must contain to be kept.
    pub payment_keyword: String,
    /// `chrono` format of delivery dates and of the period bounds.
    pub date_format: String,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub export_dir: PathBuf,
    pub transactions_file: String,
    pub managers_file: String,
    pub exclusions_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: TransactionColumns::default(),
            manager_columns: ManagerColumns::default(),
            payment_keyword: "dinheiro".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("relatorios"),
            export_dir: PathBuf::from("relatorios").join("planilhas"),
            transactions_file: "transactions.csv".to_string(),
            managers_file: "managers.csv".to_string(),
            exclusions_file: "exclusions.csv".to_string(),
        }
    }
}

impl Config {
    /// Reads a JSON config file. Fields absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&s)?;
        Ok(config)
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.data_dir.join(&self.transactions_file)
    }

    pub fn managers_path(&self) -> PathBuf {
        self.data_dir.join(&self.managers_file)
    }

    pub fn exclusions_path(&self) -> PathBuf {
        self.data_dir.join(&self.exclusions_file)
    }
}
