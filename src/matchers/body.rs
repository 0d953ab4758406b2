//! Body matcher dispatch (spec §4.1 "String"/"Regex"/"JSON"/"JSONPath"/
//! "XPath").

use serde_json::Value;

use crate::model::{BodyMatcher, MatchType};

use super::{jsonpath, string, xpath};

/// JSON comparison mode. The spec does not wire a JSON matcher mode
/// directly to `match_type`; this derives it from the enclosing
/// `match_type` (STRICT → exact structural equality, ONLY_MATCHING_FIELDS
/// → containment), consistent with how `match_type` governs every other
/// field-level matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonMode {
    Exact,
    Contains,
}

impl From<MatchType> for JsonMode {
    fn from(match_type: MatchType) -> Self {
        match match_type {
            MatchType::Strict => JsonMode::Exact,
            MatchType::OnlyMatchingFields => JsonMode::Contains,
        }
    }
}

pub fn matches(
    matcher: &BodyMatcher,
    raw: &[u8],
    parsed_json: Option<&Value>,
    match_type: MatchType,
) -> bool {
    match matcher {
        BodyMatcher::String(expected) => {
            let actual = std::str::from_utf8(raw).unwrap_or("");
            string::matches_str(expected, actual)
        }
        BodyMatcher::Regex(pattern) => {
            let actual = std::str::from_utf8(raw).unwrap_or("");
            string::matches_regex(pattern, actual)
        }
        BodyMatcher::Json(expected) => match parsed_json {
            Some(actual) => json_matches(expected, actual, match_type.into()),
            None => false,
        },
        BodyMatcher::JsonPath(expr) => match parsed_json {
            Some(actual) => jsonpath::matches(actual, expr),
            None => false,
        },
        BodyMatcher::XPath(expr) => {
            let actual = std::str::from_utf8(raw).unwrap_or("");
            xpath::matches(actual, expr)
        }
    }
}

/// Recognize a JSON-Unit placeholder string (spec §4.1, GLOSSARY).
fn placeholder_kind(s: &str) -> Option<&'static str> {
    match s {
        "${json-unit.ignore}" => Some("ignore"),
        "${json-unit.any-string}" => Some("any-string"),
        "${json-unit.any-number}" => Some("any-number"),
        "${json-unit.any-boolean}" => Some("any-boolean"),
        "${json-unit.any-object}" => Some("any-object"),
        "${json-unit.any-array}" => Some("any-array"),
        _ => None,
    }
}

fn placeholder_matches(kind: &str, actual: &Value) -> bool {
    match kind {
        "ignore" => true,
        "any-string" => actual.is_string(),
        "any-number" => actual.is_number(),
        "any-boolean" => actual.is_boolean(),
        "any-object" => actual.is_object(),
        "any-array" => actual.is_array(),
        _ => false,
    }
}

fn json_matches(expected: &Value, actual: &Value, mode: JsonMode) -> bool {
    if let Value::String(s) = expected {
        if let Some(kind) = placeholder_kind(s) {
            return placeholder_matches(kind, actual);
        }
    }

    match (expected, actual) {
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            if mode == JsonMode::Exact && expected_map.len() != actual_map.len() {
                return false;
            }
            expected_map.iter().all(|(key, expected_value)| {
                actual_map
                    .get(key)
                    .map(|actual_value| json_matches(expected_value, actual_value, mode))
                    .unwrap_or(false)
            })
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => match mode {
            JsonMode::Exact => {
                expected_items.len() == actual_items.len()
                    && expected_items
                        .iter()
                        .zip(actual_items.iter())
                        .all(|(e, a)| json_matches(e, a, mode))
            }
            JsonMode::Contains => {
                expected_items.len() <= actual_items.len()
                    && expected_items
                        .iter()
                        .zip(actual_items.iter())
                        .all(|(e, a)| json_matches(e, a, mode))
            }
        },
        (expected, actual) => expected == actual,
    }
}
