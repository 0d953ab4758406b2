//! String and regex primitive matchers (spec §4.1 "String"/"Regex").

use regex::Regex;

/// Byte-equal comparison.
pub fn matches_str(expected: &str, actual: &str) -> bool {
    expected == actual
}

/// Containment (`test`-style), not full-match; a malformed pattern is a
/// non-match, never an error (spec §4.1 "Error from malformed inputs").
pub fn matches_regex(pattern: &str, actual: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(actual))
        .unwrap_or(false)
}
