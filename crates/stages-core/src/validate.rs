//! Single-field validation rules.
//!
//! Every rule takes the raw candidate value (or `None` when the client did
//! not send one) plus the human-readable field label, and yields at most one
//! error message. Rules other than [`required`] pass on absent values, so
//! optional fields can be run through them unconditionally.

use std::sync::OnceLock;

use regex::Regex;

use crate::timestamp;

/// Maximum length of free-text fields, in characters.
pub const MAX_TEXT_LENGTH: usize = 255;

/// Fails when the value is absent or blank.
pub fn required(value: Option<&str>, field: &str) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => None,
        _ => Some(format!("{field} is required")),
    }
}

/// Fails when the value is longer than `max` characters.
pub fn max_length(value: Option<&str>, field: &str, max: usize) -> Option<String> {
    value
        .filter(|v| v.chars().count() > max)
        .map(|_| format!("{field} is too long, maximum {max} chars"))
}

/// Fails when the value is not an ISO-8601 timestamp with an offset.
pub fn iso_timestamp(value: Option<&str>, field: &str) -> Option<String> {
    value
        .filter(|v| timestamp::parse(v).is_none())
        .map(|_| format!("{field} is not in the correct format, expected YYYY-MM-DDThh:mm:ssZ"))
}

/// Fails when the value is not one of `allowed`. Comparison is exact.
pub fn enum_one_of(value: Option<&str>, field: &str, allowed: &[&str]) -> Option<String> {
    value
        .filter(|v| !allowed.contains(v))
        .map(|_| format!("{field} is not valid, expected one of: {}", allowed.join(", ")))
}

/// Fails when the value is not a 3- or 6-digit hex color such as `#F00`.
pub fn hex_color(value: Option<&str>, field: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new("(?i)^#([0-9a-f]{3}){1,2}$").expect("valid regex"));

    value
        .filter(|v| !pattern.is_match(v))
        .map(|_| format!("{field} must be a valid hex color code (e.g., #FF0000 or #F00)"))
}
