use crate::error::Result;
use crate::ingestion::{load_tables, LedgerTables};
use crate::metrics::{cash_trend, latest_month, revenue_vs_budget, MetricsEngine};
use crate::schema::{CashTrendPoint, RevenueVsBudget, BASE_CURRENCY};
use serde::{Deserialize, Serialize};

/// One-page FP&A summary: revenue against budget for the latest actuals
/// month, and the monthly cash trend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpaSnapshot {
    pub latest_month: Option<String>,
    pub revenue_vs_budget: Option<RevenueVsBudget>,
    pub cash_trend: Vec<CashTrendPoint>,
}

impl FpaSnapshot {
    /// Builds the snapshot from a single read of the tables so both
    /// sections describe the same file contents.
    pub fn build(engine: &MetricsEngine) -> Result<Self> {
        let tables = load_tables(engine.config())?;
        Ok(Self::from_tables(&tables))
    }

    pub fn from_tables(tables: &LedgerTables) -> Self {
        let latest_month = latest_month(tables);
        let revenue_vs_budget = latest_month
            .as_deref()
            .map(|month| revenue_vs_budget(tables, month, BASE_CURRENCY));

        Self {
            latest_month,
            revenue_vs_budget,
            cash_trend: cash_trend(tables),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# FP&A Snapshot\n\n");
        output.push_str("_Auto-generated from current ledger files_\n\n");

        match &self.revenue_vs_budget {
            Some(rvb) => {
                output.push_str(&format!("## Revenue vs Budget - {}\n\n", rvb.month));
                output.push_str("| Label | USD |\n");
                output.push_str("|---|---:|\n");
                output.push_str(&format!("| Actual | {} |\n", format_usd(rvb.actual_usd)));
                output.push_str(&format!("| Budget | {} |\n", format_usd(rvb.budget_usd)));
                output.push_str(&format!(
                    "| Variance | {} |\n",
                    format_usd(rvb.variance_usd())
                ));
            }
            None => output.push_str("## Revenue vs Budget\n\nNo actuals data.\n"),
        }
        output.push('\n');

        output.push_str("## Cash Trend (USD)\n\n");
        if self.cash_trend.is_empty() {
            output.push_str("No cash data.\n");
        } else {
            output.push_str("| Month | Cash |\n");
            output.push_str("|---|---:|\n");
            for point in &self.cash_trend {
                output.push_str(&format!(
                    "| {} | {} |\n",
                    point.month,
                    format_usd(point.cash_usd)
                ));
            }
        }

        output
    }
}

/// Whole-dollar amount with thousands separators, e.g. `-12,345`.
pub fn format_usd(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
