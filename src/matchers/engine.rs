//! Top-level matcher combinator: ANDs every configured field together
//! (spec §4.1).

use axum::http::HeaderMap;

use crate::model::{MatchType, RequestMatcher, RequestRecord, STANDARD_HEADER_WHITELIST};

use super::{body, multi_value, path, string};

/// Evaluate a full `RequestMatcher` against a `RequestRecord`.
pub fn matches(matcher: &RequestMatcher, request: &RequestRecord) -> bool {
    if let Some(m) = &matcher.method {
        let raw = string::matches_str(&m.value, request.method.as_str());
        if !apply_not(raw, m.not) {
            return false;
        }
    }

    if let Some(p) = &matcher.path {
        let raw = path::matches(&p.value, &request.path);
        if !apply_not(raw, p.not) {
            return false;
        }
    }

    let strict = matcher.match_type == MatchType::Strict;

    if let Some(q) = &matcher.query_params {
        if !multi_value::matches(q, &request.query_pairs(), false, strict) {
            return false;
        }
    }

    if let Some(h) = &matcher.headers {
        if !multi_value::matches(h, &header_pairs(&request.headers), true, strict) {
            return false;
        }
    }

    if let Some(b) = &matcher.body {
        let raw = body::matches(
            &b.value,
            &request.raw_body,
            request.parsed_json.as_ref(),
            matcher.match_type,
        );
        if !apply_not(raw, b.not) {
            return false;
        }
    }

    if strict {
        if matcher.query_params.is_none() && !request.query.is_empty() {
            return false;
        }
        if matcher.headers.is_none() && has_non_whitelisted_headers(&request.headers) {
            return false;
        }
    }

    true
}

fn apply_not(raw: bool, not: bool) -> bool {
    if not {
        !raw
    } else {
        raw
    }
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

fn has_non_whitelisted_headers(headers: &HeaderMap) -> bool {
    headers
        .keys()
        .any(|name| !STANDARD_HEADER_WHITELIST.contains(&name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{request::build_record, BodyMatcher, PathPattern, ValueFlag};
    use axum::http::Method;
    use bytes::Bytes;
    use serde_json::json;

    fn record(method: &str, path: &str, body: &str) -> RequestRecord {
        build_record(
            Method::from_bytes(method.as_bytes()).unwrap(),
            path.to_string(),
            None,
            HeaderMap::new(),
            Bytes::from(body.to_string()),
        )
    }

    #[test]
    fn exact_json_match_scenario() {
        let matcher = RequestMatcher {
            method: Some(ValueFlag::new("POST".to_string())),
            path: Some(ValueFlag::new(PathPattern::Literal("/api/users".to_string()))),
            query_params: None,
            headers: None,
            body: Some(ValueFlag::new(BodyMatcher::Json(
                json!({"name": "Alice", "age": 30}),
            ))),
            match_type: MatchType::OnlyMatchingFields,
        };
        let r = record("POST", "/api/users", r#"{"name":"Alice","age":30}"#);
        assert!(matches(&matcher, &r));

        let mismatch = record("POST", "/api/users", r#"{"name":"Bob","age":30}"#);
        assert!(!matches(&matcher, &mismatch));
    }

    #[test]
    fn not_inverts_path_match() {
        let matcher = RequestMatcher {
            method: None,
            path: Some(ValueFlag {
                value: PathPattern::Literal("/api/users".to_string()),
                not: true,
            }),
            query_params: None,
            headers: None,
            body: None,
            match_type: MatchType::OnlyMatchingFields,
        };
        assert!(!matches(&matcher, &record("GET", "/api/users", "")));
        assert!(matches(&matcher, &record("GET", "/other", "")));
    }
}
