//! The internal request record built by the HTTP framing layer for every
//! incoming request (spec §3 "Request record").

use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use indexmap::IndexMap;

/// A parsed incoming request, as handed to the index and matcher.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    /// Parsed query multimap, preserving repeated keys in order.
    pub query: IndexMap<String, Vec<String>>,
    /// Case-insensitive header multimap (courtesy of `http::HeaderMap`).
    pub headers: HeaderMap,
    /// Raw, unmodified body bytes — required for faithful forwarding.
    pub raw_body: Bytes,
    /// Best-effort JSON parse of the body, if it looks like JSON.
    pub parsed_json: Option<serde_json::Value>,
    /// The original raw query string, if any, preserved byte-for-byte for
    /// forwarding (spec §4.5 "query must be preserved bit-identical").
    pub raw_query: Option<String>,
}

impl RequestRecord {
    pub fn first_path_segment(&self) -> &str {
        self.path
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or("")
    }

    /// Body as a UTF-8 string, if valid; used by the string/regex matchers.
    pub fn body_as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.raw_body).ok()
    }

    /// Parse the query multimap into `&str` query pairs, in original order,
    /// rebuilt from `query` when `raw_query` is unavailable.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, values) in &self.query {
            for value in values {
                pairs.push((key.clone(), value.clone()));
            }
        }
        pairs
    }
}

/// Build a `RequestRecord` from raw pieces extracted by the axum handler.
pub fn build_record(
    method: Method,
    path: String,
    raw_query: Option<String>,
    headers: HeaderMap,
    raw_body: Bytes,
) -> RequestRecord {
    let query = raw_query
        .as_deref()
        .map(parse_query)
        .unwrap_or_default();
    let parsed_json = serde_json::from_slice(&raw_body).ok();

    RequestRecord {
        method,
        path,
        query,
        headers,
        raw_body,
        parsed_json,
        raw_query,
    }
}

fn parse_query(raw: &str) -> IndexMap<String, Vec<String>> {
    let mut map: IndexMap<String, Vec<String>> = IndexMap::new();
    for pair in form_urlencoded::parse(raw.as_bytes()) {
        map.entry(pair.0.into_owned()).or_default().push(pair.1.into_owned());
    }
    map
}
