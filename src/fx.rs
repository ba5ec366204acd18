//! Currency normalization against the monthly `fx.csv` rate table.
//!
//! Rates are keyed by `(month, currency)` and convert one unit of the currency
//! into USD. A pair that is not in the table resolves to an identity rate of
//! 1.0, i.e. the amount is taken to already be in USD.

use crate::schema::{CashSnapshot, FxRate, LedgerRow};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;

pub const IDENTITY_RATE: f64 = 1.0;

/// Anything that can be joined against the rate table.
pub trait FxKeyed {
    fn month(&self) -> &str;
    fn currency(&self) -> &str;
}

impl FxKeyed for LedgerRow {
    fn month(&self) -> &str {
        &self.month
    }

    fn currency(&self) -> &str {
        &self.currency
    }
}

impl FxKeyed for CashSnapshot {
    fn month(&self) -> &str {
        &self.month
    }

    fn currency(&self) -> &str {
        &self.currency
    }
}

/// A source row with its resolved rate and USD amount attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized<T> {
    #[serde(flatten)]
    pub row: T,
    pub rate_to_usd: f64,
    pub amount_usd: f64,
}

#[derive(Debug, Clone, Default)]
pub struct FxTable {
    rates: HashMap<(String, String), f64>,
}

impl FxTable {
    /// Builds the lookup. When a `(month, currency)` pair repeats, the last
    /// row in file order wins.
    pub fn from_rates(rates: &[FxRate]) -> Self {
        let mut table = HashMap::with_capacity(rates.len());

        for rate in rates {
            let key = (rate.month.clone(), rate.currency.clone());
            if let Some(previous) = table.insert(key, rate.rate_to_usd) {
                warn!(
                    "Duplicate fx rate for {} {}: {} replaced by {}",
                    rate.month, rate.currency, previous, rate.rate_to_usd
                );
            }
        }

        Self { rates: table }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn lookup(&self, month: &str, currency: &str) -> Option<f64> {
        self.rates
            .get(&(month.to_string(), currency.to_string()))
            .copied()
    }

    pub fn rate(&self, month: &str, currency: &str) -> f64 {
        self.lookup(month, currency).unwrap_or_else(|| {
            debug!(
                "No fx rate for {} {}, treating amount as USD",
                month, currency
            );
            IDENTITY_RATE
        })
    }

    pub fn to_usd(&self, month: &str, currency: &str, amount: f64) -> f64 {
        amount * self.rate(month, currency)
    }
}

/// Attaches a USD amount to every row. `amount` selects which field of the
/// row holds the value to convert.
pub fn to_base_currency<T, F>(rows: &[T], fx: &FxTable, amount: F) -> Vec<Normalized<T>>
where
    T: FxKeyed + Clone,
    F: Fn(&T) -> f64,
{
    rows.iter()
        .map(|row| {
            let rate_to_usd = fx.rate(row.month(), row.currency());
            Normalized {
                row: row.clone(),
                rate_to_usd,
                amount_usd: amount(row) * rate_to_usd,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(month: &str, currency: &str, rate_to_usd: f64) -> FxRate {
        FxRate {
            month: month.to_string(),
            currency: currency.to_string(),
            rate_to_usd,
        }
    }

    fn row(month: &str, currency: &str, amount: f64) -> LedgerRow {
        LedgerRow {
            month: month.to_string(),
            account: "Revenue".to_string(),
            currency: currency.to_string(),
            amount,
        }
    }

    #[test]
    fn test_known_pair_is_multiplied() {
        let fx = FxTable::from_rates(&[rate("2025-06", "EUR", 1.1)]);
        let out = to_base_currency(&[row("2025-06", "EUR", 100.0)], &fx, |r| r.amount);

        assert_eq!(out.len(), 1);
        assert!((out[0].amount_usd - 110.0).abs() < 1e-9);
        assert_eq!(out[0].rate_to_usd, 1.1);
        assert_eq!(out[0].row.amount, 100.0);
    }

    #[test]
    fn test_missing_pair_falls_back_to_identity() {
        let fx = FxTable::from_rates(&[rate("2025-06", "EUR", 1.1)]);
        let rows = [row("2025-07", "EUR", 100.0), row("2025-06", "GBP", 50.0)];
        let out = to_base_currency(&rows, &fx, |r| r.amount);

        assert_eq!(out[0].amount_usd, 100.0);
        assert_eq!(out[1].amount_usd, 50.0);
        assert_eq!(out[1].rate_to_usd, IDENTITY_RATE);
    }

    #[test]
    fn test_duplicate_pair_last_wins() {
        let fx = FxTable::from_rates(&[rate("2025-06", "EUR", 1.1), rate("2025-06", "EUR", 1.2)]);
        assert_eq!(fx.len(), 1);
        assert_eq!(fx.lookup("2025-06", "EUR"), Some(1.2));
        assert!((fx.to_usd("2025-06", "EUR", 10.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_amount_selector_applies_to_cash() {
        let fx = FxTable::from_rates(&[rate("2025-06", "JPY", 0.0065)]);
        let cash = [CashSnapshot {
            month: "2025-06".to_string(),
            amount: 1_000_000.0,
            currency: "JPY".to_string(),
        }];
        let out = to_base_currency(&cash, &fx, |c| c.amount);
        assert!((out[0].amount_usd - 6500.0).abs() < 1e-6);
    }
}
