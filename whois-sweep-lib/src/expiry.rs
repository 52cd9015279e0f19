//! Best-effort expiry date extraction from WHOIS text.

use regex::Regex;

lazy_static::lazy_static! {
    // yyyy, separator, mm, separator, dd; separators may differ
    static ref DATE_PATTERN: Regex =
        Regex::new(r"\d{4}[-/.]\d{2}[-/.]\d{2}").expect("date pattern is valid");
}

/// Find the expiry date in a taken-domain response.
///
/// Only lines containing one of `labels` (matched case-insensitively) are
/// searched. The first date-shaped substring in those lines is returned
/// verbatim, separators untouched. `None` when no labelled line carries a
/// date.
pub fn extract_expiry(raw: &str, labels: &[String]) -> Option<String> {
    raw.lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            labels.iter().any(|label| lower.contains(label.as_str()))
        })
        .find_map(|line| DATE_PATTERN.find(line).map(|m| m.as_str().to_string()))
}
