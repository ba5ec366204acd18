use thiserror::Error;

#[derive(Error, Debug)]
pub enum FpaError {
    #[error("Missing {file}. Place the CSV files under the configured data directory.")]
    MissingFile { file: String },

    #[error("Schema error in {file}: missing required column '{column}'")]
    Schema { file: String, column: String },

    #[error("Invalid value '{value}' in {file}, row {row}, column '{column}'")]
    InvalidValue {
        file: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FpaError>;
