//! # FP&A Copilot
//!
//! A library for answering natural-language finance questions over
//! multi-currency ledger flat files.
//!
//! ## Core Concepts
//!
//! - **Intent Parser**: Maps a free-text question to a [`ParsedQuery`] with a fixed
//!   set of rules (revenue vs budget, gross margin trend, opex breakdown, cash runway)
//! - **Currency Normalizer**: Converts ledger amounts to USD using a month + currency
//!   rate table, treating unknown pairs as already being USD
//! - **Metrics Engine**: Computes each metric from the flat files, re-reading them on
//!   every call so results never go stale
//! - **Dispatch**: Routes a parsed query to its metric and returns a structured
//!   [`Answer`], including guidance when a month is missing or the question is unknown
//!
//! ## Input Files
//!
//! | File | Columns |
//! |---|---|
//! | `actuals.csv`, `budget.csv` | `month, account\|account_category, currency, amount` |
//! | `fx.csv` | `month, currency, rate_to_usd` |
//! | `cash.csv` | `month, cash\|cash_usd, [currency]` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use fpa_copilot::*;
//!
//! let engine = MetricsEngine::new(FpaConfig::new("fixtures"));
//! let (query, answer) = ask(&engine, "What was June 2025 revenue vs budget in USD?")?;
//!
//! assert_eq!(query.intent, Intent::RevVsBudget);
//! if let Answer::RevenueVsBudget(result) = answer {
//!     println!("Actual {} vs budget {}", result.actual_usd, result.budget_usd);
//! }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod fx;
pub mod ingestion;
pub mod intent;
pub mod metrics;
pub mod schema;
pub mod snapshot;
pub mod utils;

pub use agent::{answer, ask, Answer, NEED_MONTH_GUIDANCE, UNSUPPORTED_GUIDANCE};
pub use config::FpaConfig;
pub use error::{FpaError, Result};
pub use fx::{to_base_currency, FxKeyed, FxTable, Normalized};
pub use ingestion::{load_tables, LedgerTables};
pub use intent::detect_intent;
pub use metrics::{MetricsEngine, DEFAULT_TREND_WINDOW};
pub use schema::*;
pub use snapshot::FpaSnapshot;
