//! Citation timestamp extraction from generated answer text.

use regex::Regex;
use std::sync::OnceLock;

/// A seconds literal: a decimal or bare-integer value directly followed by
/// the `s` unit marker, e.g. `12.5s` or `3s`.
fn seconds_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)s").expect("valid regex"))
}

/// Extract the distinct timestamps cited in an answer, sorted ascending.
///
/// Duplicate values (exact equality) are removed. `12.5s` yields only 12.5;
/// the fractional part is never matched as a separate `5s`.
pub fn extract_timestamps(answer: &str) -> Vec<f64> {
    let mut timestamps: Vec<f64> = seconds_pattern()
        .captures_iter(answer)
        .filter_map(|c| c[1].parse::<f64>().ok())
        .collect();

    timestamps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    timestamps.dedup();
    timestamps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_ascending_sort() {
        let answer = "It begins at 12.5s, then 3s, and returns to 12.5s later.";
        assert_eq!(extract_timestamps(answer), vec![3.0, 12.5]);
    }

    #[test]
    fn test_decimal_does_not_also_match_its_fraction() {
        assert_eq!(extract_timestamps("around 12.5s"), vec![12.5]);
    }

    #[test]
    fn test_bare_integer_seconds() {
        assert_eq!(extract_timestamps("starts at 90s"), vec![90.0]);
    }

    #[test]
    fn test_no_citations() {
        assert!(extract_timestamps("no timestamps mentioned here").is_empty());
        assert!(extract_timestamps("").is_empty());
    }

    #[test]
    fn test_ignores_numbers_without_unit_marker() {
        assert_eq!(extract_timestamps("chapter 3 covers 45s of material"), vec![45.0]);
    }
}
