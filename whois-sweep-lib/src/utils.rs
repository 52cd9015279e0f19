//! Utility functions for keyword validation and candidate generation.

use crate::error::SweepError;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Validate the keyword that gets paired with every TLD.
///
/// # Returns
///
/// The trimmed, lowercased keyword, or `Err(SweepError)` if it can't form a
/// domain label.
pub fn validate_keyword(keyword: &str) -> Result<String, SweepError> {
    let keyword = keyword.trim().to_lowercase();

    if keyword.is_empty() {
        return Err(SweepError::invalid_domain(keyword, "Keyword cannot be empty"));
    }

    if keyword.contains('.') {
        return Err(SweepError::invalid_domain(
            keyword,
            "Keyword must not contain a dot; TLDs are added separately",
        ));
    }

    if !is_valid_label(&keyword) {
        return Err(SweepError::invalid_domain(
            keyword,
            "Use 1-63 ASCII letters, digits or hyphens, not starting or ending with a hyphen",
        ));
    }

    Ok(keyword)
}

/// Clean up a single TLD: trim, drop a leading dot, lowercase.
///
/// Returns `None` for blanks and obviously invalid entries.
pub fn normalize_tld(tld: &str) -> Option<String> {
    let tld = tld.trim().trim_start_matches('.').to_lowercase();
    if tld.is_empty() || tld.contains(char::is_whitespace) {
        return None;
    }
    // Second-level suffixes such as "co.uk" are fine; each part must be a label
    if tld.split('.').all(|part| !part.is_empty() && is_label_chars(part)) {
        Some(tld)
    } else {
        None
    }
}

/// Parse a TLD list: one per line, `#` starts a comment, blanks ignored.
///
/// Order is kept and duplicates are dropped.
pub fn parse_tld_list(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .lines()
        .filter_map(|line| line.split('#').next())
        .filter_map(normalize_tld)
        .filter(|tld| seen.insert(tld.clone()))
        .collect()
}

/// Read and parse a TLD list file.
pub fn read_tld_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, SweepError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        SweepError::file_error(
            path.to_string_lossy(),
            format!("Failed to read TLD list: {}", e),
        )
    })?;

    let tlds = parse_tld_list(&content);
    if tlds.is_empty() {
        return Err(SweepError::file_error(
            path.to_string_lossy(),
            "No TLDs found in file",
        ));
    }
    Ok(tlds)
}

/// Build `keyword.tld` candidates, in TLD order, without duplicates.
///
/// Invalid TLD entries are skipped.
pub fn expand_keyword(keyword: &str, tlds: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tlds.iter()
        .filter_map(|tld| normalize_tld(tld))
        .map(|tld| format!("{}.{}", keyword, tld))
        .filter(|domain| seen.insert(domain.clone()))
        .collect()
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && is_label_chars(label)
}

fn is_label_chars(label: &str) -> bool {
    label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
