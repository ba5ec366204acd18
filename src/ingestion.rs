use crate::config::FpaConfig;
use crate::error::{FpaError, Result};
use crate::schema::{CashSnapshot, FxRate, LedgerRow, BASE_CURRENCY};
use crate::utils::normalize_month_label;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::path::Path;

const NA_MARKERS: [&str; 5] = ["nan", "na", "n/a", "null", "none"];

/// The four source tables, read fresh from disk for a single computation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerTables {
    pub actuals: Vec<LedgerRow>,
    pub budget: Vec<LedgerRow>,
    pub fx: Vec<FxRate>,
    pub cash: Vec<CashSnapshot>,
}

pub fn load_tables(config: &FpaConfig) -> Result<LedgerTables> {
    let actuals = read_ledger(&config.actuals_path(), &config.actuals_file)?;
    let budget = read_ledger(&config.budget_path(), &config.budget_file)?;
    let fx = read_fx(&config.fx_path(), &config.fx_file)?;
    let cash = read_cash(&config.cash_path(), &config.cash_file)?;

    Ok(LedgerTables {
        actuals,
        budget,
        fx,
        cash,
    })
}

/// Reads an actuals or budget table. `account_category` stands in for
/// `account` when the latter is absent.
pub fn read_ledger(path: &Path, file: &str) -> Result<Vec<LedgerRow>> {
    let (header, records) = read_records(path, file)?;

    let month_idx = header.require("month")?;
    let account_idx = header.require_aliased("account", "account_category")?;
    let currency_idx = header.require("currency")?;
    let amount_idx = header.require("amount")?;

    let mut rows = Vec::with_capacity(records.len());
    for (line, record) in records {
        let Some(amount) = parse_amount(&record, amount_idx, "amount", file, line)? else {
            debug!("Skipping {} line {}: missing amount", file, line);
            continue;
        };

        rows.push(LedgerRow {
            month: normalize_month_label(cell(&record, month_idx)),
            account: cell(&record, account_idx).to_string(),
            currency: cell(&record, currency_idx).to_string(),
            amount,
        });
    }

    info!("Loaded {} ledger rows from {}", rows.len(), file);
    Ok(rows)
}

pub fn read_fx(path: &Path, file: &str) -> Result<Vec<FxRate>> {
    let (header, records) = read_records(path, file)?;

    let month_idx = header.require("month")?;
    let currency_idx = header.require("currency")?;
    let rate_idx = header.require("rate_to_usd")?;

    let mut rates = Vec::with_capacity(records.len());
    for (line, record) in records {
        // A missing rate behaves like an absent pair.
        let Some(rate_to_usd) = parse_amount(&record, rate_idx, "rate_to_usd", file, line)? else {
            debug!("Skipping {} line {}: missing rate", file, line);
            continue;
        };

        rates.push(FxRate {
            month: normalize_month_label(cell(&record, month_idx)),
            currency: cell(&record, currency_idx).to_string(),
            rate_to_usd,
        });
    }

    info!("Loaded {} fx rates from {}", rates.len(), file);
    Ok(rates)
}

/// Reads cash snapshots. `cash_usd` stands in for `cash` when the latter is
/// absent, and a missing `currency` column means every row is USD.
pub fn read_cash(path: &Path, file: &str) -> Result<Vec<CashSnapshot>> {
    let (header, records) = read_records(path, file)?;

    let month_idx = header.require("month")?;
    let cash_idx = header.require_aliased("cash", "cash_usd")?;
    let currency_idx = header.position("currency");

    let mut snapshots = Vec::with_capacity(records.len());
    for (line, record) in records {
        let Some(amount) = parse_amount(&record, cash_idx, "cash", file, line)? else {
            debug!("Skipping {} line {}: missing cash amount", file, line);
            continue;
        };

        let currency = currency_idx
            .map(|idx| cell(&record, idx))
            .filter(|c| !c.is_empty())
            .unwrap_or(BASE_CURRENCY)
            .to_string();

        snapshots.push(CashSnapshot {
            month: normalize_month_label(cell(&record, month_idx)),
            amount,
            currency,
        });
    }

    info!("Loaded {} cash snapshots from {}", snapshots.len(), file);
    Ok(snapshots)
}

struct Header<'a> {
    file: &'a str,
    names: Vec<String>,
}

impl Header<'_> {
    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.position(name).ok_or_else(|| FpaError::Schema {
            file: self.file.to_string(),
            column: name.to_string(),
        })
    }

    /// The alias is only consulted when the primary column is absent.
    fn require_aliased(&self, primary: &str, alias: &str) -> Result<usize> {
        self.position(primary)
            .or_else(|| self.position(alias))
            .ok_or_else(|| FpaError::Schema {
                file: self.file.to_string(),
                column: primary.to_string(),
            })
    }
}

fn read_records<'a>(
    path: &Path,
    file: &'a str,
) -> Result<(Header<'a>, Vec<(usize, StringRecord)>)> {
    if !path.exists() {
        return Err(FpaError::MissingFile {
            file: file.to_string(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(File::open(path)?);

    let names = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let header = Header { file, names };

    let mut records = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        // Line numbers count the header row.
        records.push((idx + 2, record));
    }

    Ok((header, records))
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn parse_amount(
    record: &StringRecord,
    idx: usize,
    column: &str,
    file: &str,
    line: usize,
) -> Result<Option<f64>> {
    let raw = cell(record, idx);
    if is_missing(raw) {
        return Ok(None);
    }

    let invalid = || FpaError::InvalidValue {
        file: file.to_string(),
        row: line,
        column: column.to_string(),
        value: raw.to_string(),
    };

    let value = raw.replace(',', "").parse::<f64>().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(Some(value))
}

/// Blank cells and the usual "not available" markers.
fn is_missing(raw: &str) -> bool {
    raw.is_empty()
        || NA_MARKERS
            .iter()
            .any(|marker| raw.eq_ignore_ascii_case(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_ledger_account_category_alias() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "actuals.csv",
            "month,account_category,currency,amount,entity\n2025-06,Revenue,USD,1000,ParentCo\n",
        );

        let rows = read_ledger(&path, "actuals.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].account, "Revenue");
        assert_eq!(rows[0].amount, 1000.0);
    }

    #[test]
    fn test_ledger_prefers_account_over_alias() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "actuals.csv",
            "month,account_category,account,currency,amount\n2025-06,Sales,Revenue,USD,10\n",
        );

        let rows = read_ledger(&path, "actuals.csv").unwrap();
        assert_eq!(rows[0].account, "Revenue");
    }

    #[test]
    fn test_ledger_skips_blank_amounts_and_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "budget.csv",
            "month,account,currency,amount\n2025-06,Revenue,USD,\n2025-06,COGS,USD,\"1,200.50\"\n",
        );
        let rows = read_ledger(&path, "budget.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].amount - 1200.5).abs() < 1e-9);

        let bad = write_file(
            &dir,
            "bad.csv",
            "month,account,currency,amount\n2025-06,Revenue,USD,lots\n",
        );
        match read_ledger(&bad, "bad.csv") {
            Err(FpaError::InvalidValue { row, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_na_markers_are_skipped_like_blanks() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "actuals.csv",
            "month,account,currency,amount\n\
             2025-06,Revenue,USD,NaN\n\
             2025-06,Revenue,USD,NA\n\
             2025-06,Revenue,USD,N/A\n\
             2025-06,Revenue,USD,null\n\
             2025-06,Revenue,USD,1000\n\
             2025-06,COGS,USD,400\n",
        );

        let rows = read_ledger(&path, "actuals.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.amount.is_finite()));
        assert_eq!(rows[0].amount, 1000.0);
    }

    #[test]
    fn test_infinite_values_are_rejected() {
        let dir = TempDir::new().unwrap();

        for (idx, token) in ["inf", "-inf", "infinity"].iter().enumerate() {
            let name = format!("cash_{}.csv", idx);
            let path = write_file(&dir, &name, &format!("month,cash\n2025-06,{}\n", token));

            match read_cash(&path, &name) {
                Err(FpaError::InvalidValue { column, value, .. }) => {
                    assert_eq!(column, "cash");
                    assert_eq!(value, *token);
                }
                other => panic!("expected InvalidValue for {}, got {:?}", token, other),
            }
        }
    }

    #[test]
    fn test_cash_alias_and_default_currency() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "cash.csv", "month,cash_usd\n2025-06-30,5000\n");

        let cash = read_cash(&path, "cash.csv").unwrap();
        assert_eq!(cash.len(), 1);
        assert_eq!(cash[0].month, "2025-06");
        assert_eq!(cash[0].currency, "USD");
        assert_eq!(cash[0].amount, 5000.0);
    }

    #[test]
    fn test_cash_without_amount_column_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "cash.csv", "month,balance\n2025-06,5000\n");

        match read_cash(&path, "cash.csv") {
            Err(FpaError::Schema { column, file }) => {
                assert_eq!(column, "cash");
                assert_eq!(file, "cash.csv");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_names_file() {
        let dir = TempDir::new().unwrap();
        let err = read_fx(&dir.path().join("fx.csv"), "fx.csv").unwrap_err();
        assert!(matches!(err, FpaError::MissingFile { ref file } if file == "fx.csv"));
        assert!(err.to_string().contains("fx.csv"));
    }
}
