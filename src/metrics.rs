use crate::config::FpaConfig;
use crate::error::Result;
use crate::fx::{to_base_currency, FxTable, Normalized};
use crate::ingestion::{load_tables, LedgerTables};
use crate::schema::{
    AccountKind, CashRunway, CashTrendPoint, GrossMarginPoint, LedgerRow, OpexLine,
    RevenueVsBudget, BASE_CURRENCY,
};
use crate::utils::{mean, take_last};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_TREND_WINDOW: u32 = 3;
pub const RUNWAY_BURN_WINDOW: usize = 3;

/// Computes metrics straight from the flat files.
///
/// Every call re-reads all four tables, so results always reflect the
/// current file contents. Nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    config: FpaConfig,
}

impl MetricsEngine {
    pub fn new(config: FpaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FpaConfig {
        &self.config
    }

    fn load(&self) -> Result<LedgerTables> {
        load_tables(&self.config)
    }

    pub fn revenue_vs_budget(&self, month: &str, currency: &str) -> Result<RevenueVsBudget> {
        Ok(revenue_vs_budget(&self.load()?, month, currency))
    }

    pub fn gross_margin_trend(&self, window_months: u32) -> Result<Vec<GrossMarginPoint>> {
        Ok(gross_margin_trend(&self.load()?, window_months))
    }

    pub fn opex_breakdown(&self, month: &str) -> Result<Vec<OpexLine>> {
        Ok(opex_breakdown(&self.load()?, month))
    }

    pub fn cash_runway(&self) -> Result<CashRunway> {
        Ok(cash_runway(&self.load()?))
    }

    pub fn ebitda_proxy(&self, month: &str) -> Result<f64> {
        Ok(ebitda_proxy(&self.load()?, month))
    }

    pub fn cash_trend(&self) -> Result<Vec<CashTrendPoint>> {
        Ok(cash_trend(&self.load()?))
    }

    pub fn ledger_dump(&self) -> Result<Vec<Normalized<LedgerRow>>> {
        Ok(ledger_dump(&self.load()?))
    }

    pub fn latest_month(&self) -> Result<Option<String>> {
        Ok(latest_month(&self.load()?))
    }
}

/// Actual and budgeted revenue for one month, in USD.
///
/// `currency` is echoed back for labelling; amounts are never converted
/// out of USD.
pub fn revenue_vs_budget(tables: &LedgerTables, month: &str, currency: &str) -> RevenueVsBudget {
    if currency != BASE_CURRENCY {
        debug!(
            "Revenue vs budget requested in {}, reporting in {}",
            currency, BASE_CURRENCY
        );
    }

    let fx = FxTable::from_rates(&tables.fx);
    let is_revenue = |row: &LedgerRow| row.month == month && row.kind() == AccountKind::Revenue;

    RevenueVsBudget {
        month: month.to_string(),
        actual_usd: sum_usd(&tables.actuals, &fx, is_revenue),
        budget_usd: sum_usd(&tables.budget, &fx, is_revenue),
        requested_currency: currency.to_string(),
    }
}

/// Monthly gross margin, ascending by month, limited to the last
/// `window_months` months that have either revenue or COGS.
pub fn gross_margin_trend(tables: &LedgerTables, window_months: u32) -> Vec<GrossMarginPoint> {
    let fx = FxTable::from_rates(&tables.fx);
    let revenue = monthly_usd(&tables.actuals, &fx, |row| row.kind() == AccountKind::Revenue);
    let cogs = monthly_usd(&tables.actuals, &fx, |row| row.kind() == AccountKind::Cogs);

    let points = union_months([&revenue, &cogs])
        .into_iter()
        .map(|month| {
            let revenue_usd = revenue.get(&month).copied().unwrap_or(0.0);
            let cogs_usd = cogs.get(&month).copied().unwrap_or(0.0);
            let gm_pct = if revenue_usd == 0.0 {
                None
            } else {
                Some((revenue_usd - cogs_usd) / revenue_usd * 100.0)
            };

            GrossMarginPoint {
                month,
                revenue_usd,
                cogs_usd,
                gm_pct,
            }
        })
        .collect();

    take_last(points, window_months as usize)
}

/// Opex for one month grouped by account, largest first. Empty when the
/// month has no `Opex:` rows.
pub fn opex_breakdown(tables: &LedgerTables, month: &str) -> Vec<OpexLine> {
    let rows: Vec<LedgerRow> = tables
        .actuals
        .iter()
        .filter(|row| row.month == month && row.kind().is_opex())
        .cloned()
        .collect();

    if rows.is_empty() {
        return Vec::new();
    }

    let fx = FxTable::from_rates(&tables.fx);
    let mut by_account: BTreeMap<String, f64> = BTreeMap::new();
    for normalized in to_base_currency(&rows, &fx, |row| row.amount) {
        *by_account.entry(normalized.row.account).or_default() += normalized.amount_usd;
    }

    let mut lines: Vec<OpexLine> = by_account
        .into_iter()
        .map(|(account, amount_usd)| OpexLine {
            account,
            amount_usd,
        })
        .collect();
    lines.sort_by(|a, b| b.amount_usd.total_cmp(&a.amount_usd));
    lines
}

/// Latest cash balance and the months it lasts at the trailing average burn.
///
/// Net burn per month is `(COGS + Opex) - Revenue`, averaged over the last
/// three months with any activity. Cash is summed per month and the latest
/// month is taken as the current balance.
pub fn cash_runway(tables: &LedgerTables) -> CashRunway {
    let trend = cash_trend(tables);
    let Some(latest) = trend.last() else {
        return CashRunway {
            cash_usd: 0.0,
            runway_months: None,
        };
    };

    let burn = monthly_net_burn(tables);
    let recent: Vec<f64> = take_last(burn.into_values().collect(), RUNWAY_BURN_WINDOW);
    let avg_burn = mean(&recent);

    let runway_months = match avg_burn {
        Some(avg) if avg > 0.0 => Some(latest.cash_usd / avg),
        _ => None,
    };

    debug!(
        "Cash runway: latest cash {} in {}, average burn {:?}",
        latest.cash_usd, latest.month, avg_burn
    );

    CashRunway {
        cash_usd: latest.cash_usd,
        runway_months,
    }
}

/// `Revenue - COGS - Opex` for one month, each side normalized on its own.
pub fn ebitda_proxy(tables: &LedgerTables, month: &str) -> f64 {
    let fx = FxTable::from_rates(&tables.fx);
    let in_month = |row: &LedgerRow| row.month == month;

    let revenue = sum_usd(&tables.actuals, &fx, |row| {
        in_month(row) && row.kind() == AccountKind::Revenue
    });
    let cogs = sum_usd(&tables.actuals, &fx, |row| {
        in_month(row) && row.kind() == AccountKind::Cogs
    });
    let opex = sum_usd(&tables.actuals, &fx, |row| in_month(row) && row.kind().is_opex());

    revenue - cogs - opex
}

/// Cash per month in USD, rows sharing a month summed, ascending.
pub fn cash_trend(tables: &LedgerTables) -> Vec<CashTrendPoint> {
    let fx = FxTable::from_rates(&tables.fx);
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();

    for normalized in to_base_currency(&tables.cash, &fx, |snapshot| snapshot.amount) {
        *by_month.entry(normalized.row.month).or_default() += normalized.amount_usd;
    }

    by_month
        .into_iter()
        .map(|(month, cash_usd)| CashTrendPoint { month, cash_usd })
        .collect()
}

/// Every actuals row, recognized account or not, with its USD amount.
pub fn ledger_dump(tables: &LedgerTables) -> Vec<Normalized<LedgerRow>> {
    let fx = FxTable::from_rates(&tables.fx);
    to_base_currency(&tables.actuals, &fx, |row| row.amount)
}

pub fn latest_month(tables: &LedgerTables) -> Option<String> {
    tables.actuals.iter().map(|row| row.month.clone()).max()
}

fn monthly_net_burn(tables: &LedgerTables) -> BTreeMap<String, f64> {
    let fx = FxTable::from_rates(&tables.fx);
    let revenue = monthly_usd(&tables.actuals, &fx, |row| row.kind() == AccountKind::Revenue);
    let cogs = monthly_usd(&tables.actuals, &fx, |row| row.kind() == AccountKind::Cogs);
    let opex = monthly_usd(&tables.actuals, &fx, |row| row.kind().is_opex());

    union_months([&revenue, &cogs, &opex])
        .into_iter()
        .map(|month| {
            let value = |series: &BTreeMap<String, f64>| series.get(&month).copied().unwrap_or(0.0);
            let net = value(&cogs) + value(&opex) - value(&revenue);
            (month, net)
        })
        .collect()
}

/// Sums matching rows per `(month, currency)`, converts each group to USD
/// and folds the groups into a per-month total.
fn monthly_usd<P>(rows: &[LedgerRow], fx: &FxTable, keep: P) -> BTreeMap<String, f64>
where
    P: Fn(&LedgerRow) -> bool,
{
    let mut groups: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for row in rows.iter().filter(|&row| keep(row)) {
        *groups
            .entry((row.month.as_str(), row.currency.as_str()))
            .or_default() += row.amount;
    }

    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for ((month, currency), amount) in groups {
        *by_month.entry(month.to_string()).or_default() += fx.to_usd(month, currency, amount);
    }
    by_month
}

fn sum_usd<P>(rows: &[LedgerRow], fx: &FxTable, keep: P) -> f64
where
    P: Fn(&LedgerRow) -> bool,
{
    rows.iter()
        .filter(|&row| keep(row))
        .map(|row| fx.to_usd(&row.month, &row.currency, row.amount))
        // `sum()` starts from -0.0; an empty month must report 0.0.
        .fold(0.0, |acc, amount| acc + amount)
}

fn union_months<const N: usize>(series: [&BTreeMap<String, f64>; N]) -> BTreeSet<String> {
    series
        .iter()
        .flat_map(|s| s.keys().cloned())
        .collect()
}
