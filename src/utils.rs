use chrono::{Datelike, NaiveDate};

const MONTH_PREFIXES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Formats a calendar month as "YYYY-MM". Returns `None` for an invalid month.
pub fn month_label(year: i32, month: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|date| date.format("%Y-%m").to_string())
}

/// Maps a month name to its number using the first three letters,
/// so "June", "Jun" and "JUNE" all give 6.
pub fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    MONTH_PREFIXES
        .iter()
        .position(|p| *p == prefix)
        .map(|idx| idx as u32 + 1)
}

/// Coerces a raw month cell to its string label.
///
/// The cell is trimmed. A full `YYYY-MM-DD` date is reduced to `YYYY-MM`;
/// anything else is kept verbatim so that joins compare the same text.
pub fn normalize_month_label(raw: &str) -> String {
    let trimmed = raw.trim();
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => format!("{:04}-{:02}", date.year(), date.month()),
        Err(_) => trimmed.to_string(),
    }
}

/// Keeps the last `n` items of an already ordered sequence.
pub fn take_last<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    let skip = items.len().saturating_sub(n);
    items.drain(..skip);
    items
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().fold(0.0, |acc, v| acc + v) / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(2025, 6), Some("2025-06".to_string()));
        assert_eq!(month_label(2025, 12), Some("2025-12".to_string()));
        assert_eq!(month_label(2025, 13), None);
    }

    #[test]
    fn test_month_number_prefix_insensitive() {
        assert_eq!(month_number("June"), Some(6));
        assert_eq!(month_number("jun"), Some(6));
        assert_eq!(month_number("SEPTEMBER"), Some(9));
        assert_eq!(month_number("Sept"), Some(9));
        assert_eq!(month_number("ju"), None);
        assert_eq!(month_number("month"), None);
    }

    #[test]
    fn test_normalize_month_label() {
        assert_eq!(normalize_month_label(" 2025-06 "), "2025-06");
        assert_eq!(normalize_month_label("2025-06-30"), "2025-06");
        assert_eq!(normalize_month_label("202506"), "202506");
    }

    #[test]
    fn test_take_last() {
        assert_eq!(take_last(vec![1, 2, 3, 4], 2), vec![3, 4]);
        assert_eq!(take_last(vec![1, 2], 5), vec![1, 2]);
        assert!(take_last(vec![1, 2], 0).is_empty());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }
}
