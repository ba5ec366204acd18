use crate::error::{FpaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "FPA_DATA_DIR";

/// Where the four ledger flat files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FpaConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_actuals_file")]
    pub actuals_file: String,
    #[serde(default = "default_budget_file")]
    pub budget_file: String,
    #[serde(default = "default_fx_file")]
    pub fx_file: String,
    #[serde(default = "default_cash_file")]
    pub cash_file: String,
}

impl Default for FpaConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            actuals_file: default_actuals_file(),
            budget_file: default_budget_file(),
            fx_file: default_fx_file(),
            cash_file: default_cash_file(),
        }
    }
}

impl FpaConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Uses `FPA_DATA_DIR` when set, otherwise `fixtures/`.
    pub fn from_env() -> Self {
        match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self::new(dir.trim()),
            _ => Self::default(),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let files = [
            ("actuals_file", &self.actuals_file),
            ("budget_file", &self.budget_file),
            ("fx_file", &self.fx_file),
            ("cash_file", &self.cash_file),
        ];

        for (field, name) in files {
            if name.trim().is_empty() {
                return Err(FpaError::Config(format!("{} must not be empty", field)));
            }
        }

        Ok(())
    }

    pub fn actuals_path(&self) -> PathBuf {
        self.data_dir.join(&self.actuals_file)
    }

    pub fn budget_path(&self) -> PathBuf {
        self.data_dir.join(&self.budget_file)
    }

    pub fn fx_path(&self) -> PathBuf {
        self.data_dir.join(&self.fx_file)
    }

    pub fn cash_path(&self) -> PathBuf {
        self.data_dir.join(&self.cash_file)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("fixtures")
}

fn default_actuals_file() -> String {
    "actuals.csv".to_string()
}

fn default_budget_file() -> String {
    "budget.csv".to_string()
}

fn default_fx_file() -> String {
    "fx.csv".to_string()
}

fn default_cash_file() -> String {
    "cash.csv".to_string()
}
