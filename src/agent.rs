use crate::error::Result;
use crate::intent::detect_intent;
use crate::metrics::{MetricsEngine, DEFAULT_TREND_WINDOW};
use crate::schema::{
    CashRunway, GrossMarginPoint, Intent, OpexLine, ParsedQuery, RevenueVsBudget,
};
use log::info;
use serde::{Deserialize, Serialize};

pub const NEED_MONTH_GUIDANCE: &str = "Please include a month like 'June 2025'.";
pub const UNSUPPORTED_GUIDANCE: &str =
    "I can help with: revenue vs budget, GM% trend, Opex breakdown, and cash runway.";

/// Structured answer handed to whatever renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    RevenueVsBudget(RevenueVsBudget),
    GrossMarginTrend {
        window_months: u32,
        points: Vec<GrossMarginPoint>,
    },
    OpexBreakdown {
        month: String,
        lines: Vec<OpexLine>,
    },
    CashRunway(CashRunway),
    /// A month-scoped question arrived without a month.
    NeedMonth { intent: Intent },
    Unsupported,
}

impl Answer {
    /// Text to show instead of a result, if any.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Answer::NeedMonth { .. } => Some(NEED_MONTH_GUIDANCE),
            Answer::Unsupported => Some(UNSUPPORTED_GUIDANCE),
            _ => None,
        }
    }

    /// True when the answer carries no rows to display.
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::GrossMarginTrend { points, .. } => points.is_empty(),
            Answer::OpexBreakdown { lines, .. } => lines.is_empty(),
            Answer::NeedMonth { .. } | Answer::Unsupported => true,
            Answer::RevenueVsBudget(_) | Answer::CashRunway(_) => false,
        }
    }
}

/// Routes a parsed query to its metric. Month-scoped intents without a month
/// short-circuit to [`Answer::NeedMonth`] without reading any file.
pub fn answer(engine: &MetricsEngine, query: &ParsedQuery) -> Result<Answer> {
    if query.intent.requires_month() && query.month.is_none() {
        return Ok(Answer::NeedMonth {
            intent: query.intent,
        });
    }

    let answer = match (query.intent, query.month.as_deref()) {
        (Intent::RevVsBudget, Some(month)) => {
            Answer::RevenueVsBudget(engine.revenue_vs_budget(month, &query.currency)?)
        }
        (Intent::OpexBreakdown, Some(month)) => Answer::OpexBreakdown {
            month: month.to_string(),
            lines: engine.opex_breakdown(month)?,
        },
        (Intent::GmTrend, _) => {
            let window_months = query.window_months.unwrap_or(DEFAULT_TREND_WINDOW);
            Answer::GrossMarginTrend {
                window_months,
                points: engine.gross_margin_trend(window_months)?,
            }
        }
        (Intent::CashRunway, _) => Answer::CashRunway(engine.cash_runway()?),
        _ => Answer::Unsupported,
    };

    Ok(answer)
}

/// Parses the question and answers it in one step.
pub fn ask(engine: &MetricsEngine, question: &str) -> Result<(ParsedQuery, Answer)> {
    let query = detect_intent(question);
    info!(
        "Answering {:?} (month: {:?}, window: {:?})",
        query.intent, query.month, query.window_months
    );
    let answer = answer(engine, &query)?;
    Ok((query, answer))
}
