//! Multi-value matcher for `query_params` and `headers` (spec §4.1
//! "Multi-value").
//!
//! Resolves the first Open Question (spec §9): a list of expected values
//! for one key requires every value present among the actual values for
//! that key (set semantics), not an exact ordered list.

use std::collections::HashSet;

use crate::model::{ExpectedValue, MultiValueMatcher, STANDARD_HEADER_WHITELIST};

use super::string;

/// `case_insensitive_keys` is set for headers, unset for query params.
/// `strict_extra_keys` is set when the enclosing `match_type` is `STRICT`.
pub fn matches(
    matcher: &MultiValueMatcher,
    actual: &[(String, String)],
    case_insensitive_keys: bool,
    strict_extra_keys: bool,
) -> bool {
    let raw = raw_matches(matcher, actual, case_insensitive_keys, strict_extra_keys);
    if matcher.not {
        !raw
    } else {
        raw
    }
}

fn raw_matches(
    matcher: &MultiValueMatcher,
    actual: &[(String, String)],
    case_insensitive_keys: bool,
    strict_extra_keys: bool,
) -> bool {
    let normalize = |k: &str| {
        if case_insensitive_keys {
            k.to_ascii_lowercase()
        } else {
            k.to_string()
        }
    };

    let mut unexplained: HashSet<String> = actual.iter().map(|(k, _)| normalize(k)).collect();

    for (expected_key, expected_values) in &matcher.expected {
        let key_norm = normalize(expected_key);
        let values_for_key: Vec<&str> = actual
            .iter()
            .filter(|(k, _)| normalize(k) == key_norm)
            .map(|(_, v)| v.as_str())
            .collect();

        if values_for_key.is_empty() {
            return false;
        }

        let all_satisfied = expected_values.iter().all(|expected| {
            values_for_key.iter().any(|actual_value| match expected {
                // Spec §4.1 "value comparison is string-or-regex (each
                // matcher tried in turn)" — a plain value may also be a
                // regex, so try literal comparison first, then regex.
                ExpectedValue::String(s) => {
                    string::matches_str(s, actual_value) || string::matches_regex(s, actual_value)
                }
                ExpectedValue::Regex(p) => string::matches_regex(p, actual_value),
            })
        });

        if !all_satisfied {
            return false;
        }

        unexplained.remove(&key_norm);
    }

    if strict_extra_keys {
        let whitelist: HashSet<&str> = if case_insensitive_keys {
            STANDARD_HEADER_WHITELIST.iter().copied().collect()
        } else {
            HashSet::new()
        };
        if unexplained.iter().any(|key| !whitelist.contains(key.as_str())) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn matcher(expected: &[(&str, &str)]) -> MultiValueMatcher {
        let mut map = IndexMap::new();
        for (k, v) in expected {
            map.insert(k.to_string(), vec![ExpectedValue::String(v.to_string())]);
        }
        MultiValueMatcher {
            expected: map,
            not: false,
        }
    }

    #[test]
    fn header_names_compared_case_insensitively() {
        let m = matcher(&[("Content-Type", "application/json")]);
        let actual = vec![("content-type".to_string(), "application/json".to_string())];
        assert!(matches(&m, &actual, true, false));
    }

    #[test]
    fn strict_rejects_unexplained_non_whitelisted_keys() {
        let m = matcher(&[("content-type", "application/json")]);
        let actual = vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("x-custom".to_string(), "1".to_string()),
        ];
        assert!(!matches(&m, &actual, true, true));
    }

    #[test]
    fn strict_allows_whitelisted_unexplained_keys() {
        let m = matcher(&[("content-type", "application/json")]);
        let actual = vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("accept".to_string(), "*/*".to_string()),
        ];
        assert!(matches(&m, &actual, true, true));
    }

    #[test]
    fn explicit_assertion_on_whitelisted_header_is_a_normal_match() {
        let m = matcher(&[("accept", "application/json")]);
        let actual = vec![("accept".to_string(), "text/plain".to_string())];
        assert!(!matches(&m, &actual, true, true));
    }

    #[test]
    fn string_expected_value_falls_back_to_regex_when_literal_differs() {
        let m = matcher(&[("x-trace-id", "^[0-9a-f]{8}$")]);
        let actual = vec![("x-trace-id".to_string(), "deadbeef".to_string())];
        assert!(matches(&m, &actual, true, false));
    }
}
