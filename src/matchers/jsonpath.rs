//! JSONPath matcher: matches if the result set is non-empty (spec §4.1
//! "JSONPath").

use jsonpath_rust::JsonPathQuery;
use serde_json::Value;

pub fn matches(actual: &Value, expr: &str) -> bool {
    match actual.clone().path(expr) {
        Ok(Value::Array(results)) => !results.is_empty(),
        Ok(Value::Null) => false,
        Ok(_) => true,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_empty_result_set_matches() {
        let body = json!({"users": [{"name": "Alice"}]});
        assert!(matches(&body, "$.users[?(@.name == 'Alice')]"));
        assert!(!matches(&body, "$.users[?(@.name == 'Bob')]"));
    }

    #[test]
    fn malformed_expression_is_a_non_match() {
        let body = json!({});
        assert!(!matches(&body, "$[not valid"));
    }
}
