use std::path::PathBuf;

/// Failures that abort a run. Malformed delivery dates are not in here: the
/// filter drops and counts them instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: required column '{column}' not found", .file.display())]
    MissingColumn { file: PathBuf, column: String },

    #[error("{}: row {row}: column '{column}' is empty", .file.display())]
    MissingField {
        file: PathBuf,
        row: usize,
        column: String,
    },

    #[error("{}: row {row}: '{value}' is not a valid amount", .file.display())]
    InvalidAmount {
        file: PathBuf,
        row: usize,
        value: String,
    },

    #[error("'{value}' is not a valid date (expected DD/MM/YYYY)")]
    InvalidDate { value: String },

    #[error("input closed while waiting for {prompt}")]
    InputClosed { prompt: String },
}

pub type Result<T> = std::result::Result<T, Error>;
