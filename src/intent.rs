//! Rule-based intent detection over free-text finance questions.
//!
//! Rules are tried top-down and the first whose predicate matches builds the
//! query. Order matters for overlapping keywords: "gross margin vs budget"
//! resolves to revenue vs budget because that rule comes first.

use crate::metrics::DEFAULT_TREND_WINDOW;
use crate::schema::{Intent, ParsedQuery, BASE_CURRENCY};
use crate::utils::{month_label, month_number};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    static ref CURRENCY_REGEX: Regex =
        Regex::new(r"\b(?:in|to)\s+(usd|eur|gbp|jpy|krw)\b").expect("Invalid regex pattern");

    static ref MONTH_REGEX: Regex =
        Regex::new(r"(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+(20\d{2})")
            .expect("Invalid regex pattern");

    static ref WINDOW_REGEX: Regex =
        Regex::new(r"last\s+(\d+)\s+months?").expect("Invalid regex pattern");
}

struct IntentRule {
    intent: Intent,
    matches: fn(&str) -> bool,
    build: fn(&str, String) -> ParsedQuery,
}

const RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::RevVsBudget,
        matches: |q| (q.contains("revenue") && q.contains("budget")) || q.contains("vs budget"),
        build: |q, currency| ParsedQuery {
            month: extract_month(q),
            currency,
            ..ParsedQuery::new(Intent::RevVsBudget)
        },
    },
    IntentRule {
        intent: Intent::GmTrend,
        matches: |q| q.contains("gross margin") || q.contains("gm%"),
        build: |q, currency| ParsedQuery {
            window_months: Some(extract_window(q).unwrap_or(DEFAULT_TREND_WINDOW)),
            currency,
            ..ParsedQuery::new(Intent::GmTrend)
        },
    },
    IntentRule {
        intent: Intent::OpexBreakdown,
        matches: |q| q.contains("opex") && (q.contains("breakdown") || q.contains("by category")),
        build: |q, currency| ParsedQuery {
            month: extract_month(q),
            currency,
            ..ParsedQuery::new(Intent::OpexBreakdown)
        },
    },
    IntentRule {
        intent: Intent::CashRunway,
        matches: |q| q.contains("cash runway") || (q.contains("runway") && q.contains("cash")),
        build: |_, currency| ParsedQuery {
            currency,
            ..ParsedQuery::new(Intent::CashRunway)
        },
    },
];

/// Maps a free-text question to a structured query. Matching is
/// case-insensitive throughout.
pub fn detect_intent(text: &str) -> ParsedQuery {
    let lowered = text.to_lowercase();
    let currency = extract_currency(&lowered);

    for rule in RULES {
        if (rule.matches)(&lowered) {
            debug!("Question matched intent {:?}", rule.intent);
            return (rule.build)(&lowered, currency);
        }
    }

    debug!("No intent rule matched");
    ParsedQuery {
        currency,
        ..ParsedQuery::new(Intent::Unknown)
    }
}

/// "in EUR" / "to gbp" style currency request, USD when absent.
pub fn extract_currency(text: &str) -> String {
    CURRENCY_REGEX
        .captures(&text.to_lowercase())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_else(|| BASE_CURRENCY.to_string())
}

/// Month name plus four-digit year, e.g. "June 2025" or "jun 2025" -> "2025-06".
pub fn extract_month(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let caps = MONTH_REGEX.captures(&lowered)?;
    let month = month_number(caps.get(1)?.as_str())?;
    let year: i32 = caps.get(2)?.as_str().parse().ok()?;
    month_label(year, month)
}

/// "last N months". A zero window counts as absent; a window too large for
/// `u32` is clamped to `u32::MAX`, which keeps every month.
pub fn extract_window(text: &str) -> Option<u32> {
    let lowered = text.to_lowercase();
    let digits = WINDOW_REGEX.captures(&lowered)?.get(1)?.as_str();
    let window = digits.parse::<u32>().unwrap_or(u32::MAX);
    (window > 0).then_some(window)
}
