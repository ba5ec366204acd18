use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const BASE_CURRENCY: &str = "USD";

pub const REVENUE_ACCOUNT: &str = "Revenue";
pub const COGS_ACCOUNT: &str = "COGS";
pub const OPEX_PREFIX: &str = "Opex:";

/// One line of the actuals or budget ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LedgerRow {
    #[schemars(description = "Reporting month in YYYY-MM format")]
    pub month: String,
    #[schemars(description = "Account name, e.g. 'Revenue', 'COGS' or 'Opex:Marketing'")]
    pub account: String,
    #[schemars(description = "ISO-style currency code the amount is expressed in")]
    pub currency: String,
    pub amount: f64,
}

impl LedgerRow {
    pub fn kind(&self) -> AccountKind {
        AccountKind::classify(&self.account)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FxRate {
    pub month: String,
    pub currency: String,
    #[schemars(description = "Multiplier converting one unit of the currency into USD")]
    pub rate_to_usd: f64,
}

/// Point-in-time cash balance reported for a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CashSnapshot {
    pub month: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum AccountKind {
    #[schemars(description = "Top-line revenue (account named exactly 'Revenue')")]
    Revenue,

    #[schemars(description = "Cost of goods sold (account named exactly 'COGS')")]
    Cogs,

    #[schemars(description = "Operating expense; carries the category after the 'Opex:' prefix")]
    Opex(String),

    #[schemars(description = "Any other account. Ignored by every metric except the ledger dump.")]
    Other,
}

impl AccountKind {
    pub fn classify(account: &str) -> Self {
        if account == REVENUE_ACCOUNT {
            Self::Revenue
        } else if account == COGS_ACCOUNT {
            Self::Cogs
        } else if let Some(category) = account.strip_prefix(OPEX_PREFIX) {
            Self::Opex(category.to_string())
        } else {
            Self::Other
        }
    }

    pub fn is_opex(&self) -> bool {
        matches!(self, Self::Opex(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    #[schemars(description = "Revenue actual against budget for a single month")]
    RevVsBudget,

    #[schemars(description = "Gross margin percentage over a trailing window of months")]
    GmTrend,

    #[schemars(description = "Operating expenses by category for a single month")]
    OpexBreakdown,

    #[schemars(description = "Latest cash balance and months of runway at the current burn")]
    CashRunway,

    Unknown,
}

impl Intent {
    /// Intents that cannot be answered without a month.
    pub fn requires_month(&self) -> bool {
        matches!(self, Self::RevVsBudget | Self::OpexBreakdown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedQuery {
    pub intent: Intent,

    #[serde(default)]
    #[schemars(description = "Requested month in YYYY-MM format, when the question names one")]
    pub month: Option<String>,

    #[serde(default)]
    #[schemars(description = "Trailing window in months for trend questions")]
    pub window_months: Option<u32>,

    #[serde(default = "default_currency")]
    #[schemars(description = "Requested output currency. Defaults to USD.")]
    pub currency: String,
}

impl ParsedQuery {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            month: None,
            window_months: None,
            currency: default_currency(),
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ParsedQuery)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RevenueVsBudget {
    pub month: String,
    pub actual_usd: f64,
    pub budget_usd: f64,
    #[schemars(
        description = "Currency the caller asked for. Amounts are always expressed in USD."
    )]
    pub requested_currency: String,
}

impl RevenueVsBudget {
    pub fn variance_usd(&self) -> f64 {
        self.actual_usd - self.budget_usd
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GrossMarginPoint {
    pub month: String,
    pub revenue_usd: f64,
    pub cogs_usd: f64,
    #[schemars(description = "Gross margin percent. Absent when revenue for the month is zero.")]
    pub gm_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OpexLine {
    pub account: String,
    pub amount_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CashRunway {
    pub cash_usd: f64,
    #[schemars(
        description = "Months of cash at the trailing 3-month average burn. Absent when burn is zero or negative."
    )]
    pub runway_months: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CashTrendPoint {
    pub month: String,
    pub cash_usd: f64,
}

fn default_currency() -> String {
    BASE_CURRENCY.to_string()
}
