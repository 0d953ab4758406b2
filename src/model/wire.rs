//! On-the-wire JSON shape for expectations (PUT body, persistence file,
//! initialization file — spec §6 "Identical schema to the PUT body").
//!
//! This module absorbs the source ecosystem's duck-typed matcher fields
//! (a field may be a bare literal or `{value, not}` — spec §9 pattern #2)
//! behind `serde(untagged)` and normalizes everything into the validated
//! types in `expectation.rs` via `ExpectationWire::admit`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::expectation::{
    Action, BodyMatcher, BodySpec, CannedResponse, Delay, Expectation, ExpectedValue, Forward,
    MatchType, MultiValueMatcher, PathMatcher, PathPattern, RequestMatcher, ResponseBody, Scheme,
    ValueFlag,
};

/// Whether an admission failure is a malformed document (400) or a
/// well-formed one that is semantically rejected (406) — spec §6
/// "Validation failures return 400 ...; semantic rejections return 406".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Shape,
    Semantic,
}

/// A single admission failure (spec §4.3, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    pub kind: ValidationKind,
}

impl ValidationError {
    pub fn semantic(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            kind: ValidationKind::Semantic,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

fn err(msg: impl Into<String>) -> ValidationError {
    ValidationError {
        message: msg.into(),
        kind: ValidationKind::Shape,
    }
}

/// A bare value or a `{value, not}` wrapper — spec §9 pattern #2.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
enum FlaggedWire<T> {
    Literal(T),
    Flagged {
        value: T,
        #[serde(default)]
        not: bool,
    },
}

impl<T> FlaggedWire<T> {
    fn into_flag(self) -> ValueFlag<T> {
        match self {
            FlaggedWire::Literal(value) => ValueFlag { value, not: false },
            FlaggedWire::Flagged { value, not } => ValueFlag { value, not },
        }
    }
}

/// One or many values for a query/header entry.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
enum OneOrManyWire {
    One(String),
    Many(Vec<String>),
}

impl OneOrManyWire {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrManyWire::One(v) => vec![v],
            OneOrManyWire::Many(v) => v,
        }
    }
}

/// `query_params` / `headers`: either a bare mapping, or `{value, not}`
/// wrapping one.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
enum MultiValueWire {
    Flagged {
        value: IndexMap<String, OneOrManyWire>,
        #[serde(default)]
        not: bool,
    },
    Plain(IndexMap<String, OneOrManyWire>),
}

impl MultiValueWire {
    fn into_matcher(self) -> MultiValueMatcher {
        let (map, not) = match self {
            MultiValueWire::Flagged { value, not } => (value, not),
            MultiValueWire::Plain(value) => (value, false),
        };
        let expected = map
            .into_iter()
            .map(|(k, v)| (k, v.into_vec().into_iter().map(ExpectedValue::String).collect()))
            .collect();
        MultiValueMatcher { expected, not }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
enum BodyMatcherWire {
    String { value: String },
    Json { value: Value },
    Jsonpath { value: String },
    Xpath { value: String },
    Regex { value: String },
}

impl BodyMatcherWire {
    fn into_matcher(self) -> BodyMatcher {
        match self {
            BodyMatcherWire::String { value } => BodyMatcher::String(value),
            BodyMatcherWire::Json { value } => BodyMatcher::Json(value),
            BodyMatcherWire::Jsonpath { value } => BodyMatcher::JsonPath(value),
            BodyMatcherWire::Xpath { value } => BodyMatcher::XPath(value),
            BodyMatcherWire::Regex { value } => BodyMatcher::Regex(value),
        }
    }
}

/// `body` matcher: a bare variant, or `{value: <variant>, not}`.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
enum BodySpecWire {
    Flagged {
        value: Box<BodyMatcherWire>,
        #[serde(default)]
        not: bool,
    },
    Plain(BodyMatcherWire),
}

impl BodySpecWire {
    fn into_spec(self) -> BodySpec {
        match self {
            BodySpecWire::Flagged { value, not } => ValueFlag {
                value: value.into_matcher(),
                not,
            },
            BodySpecWire::Plain(value) => ValueFlag {
                value: value.into_matcher(),
                not: false,
            },
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum MatchTypeWire {
    Strict,
    #[default]
    OnlyMatchingFields,
}

impl From<MatchTypeWire> for MatchType {
    fn from(value: MatchTypeWire) -> Self {
        match value {
            MatchTypeWire::Strict => MatchType::Strict,
            MatchTypeWire::OnlyMatchingFields => MatchType::OnlyMatchingFields,
        }
    }
}

/// Wire shape of `httpRequest` (spec §3 "RequestMatcher").
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct RequestMatcherWire {
    method: Option<FlaggedWire<String>>,
    path: Option<FlaggedWire<String>>,
    query_params: Option<MultiValueWire>,
    headers: Option<MultiValueWire>,
    body: Option<BodySpecWire>,
    #[serde(default)]
    match_type: MatchTypeWire,
}

impl RequestMatcherWire {
    fn admit(self) -> Result<RequestMatcher, ValidationError> {
        let path = self
            .path
            .map(|flagged| flagged.into_flag())
            .map(|flag| ValueFlag {
                value: classify_path(&flag.value),
                not: flag.not,
            });

        Ok(RequestMatcher {
            method: self.method.map(|m| m.into_flag()),
            path,
            query_params: self.query_params.map(|m| m.into_matcher()),
            headers: self.headers.map(|m| m.into_matcher()),
            body: self.body.map(|b| b.into_spec()),
            match_type: self.match_type.into(),
        })
    }
}

/// A literal path is classified into literal / wildcard / regex, per
/// spec §3 ("literal string, glob (`*` wildcard), or `/regex/` form").
fn classify_path(raw: &str) -> PathPattern {
    if raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/') && raw != "/" {
        PathPattern::Regex(raw[1..raw.len() - 1].to_string())
    } else if raw.contains('*') {
        PathPattern::Wildcard(raw.to_string())
    } else {
        PathPattern::Literal(raw.to_string())
    }
}

/// Bare milliseconds or `{timeUnit, value}` (spec §6 "Delay specification").
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
enum DelayWire {
    Millis(u64),
    Unit {
        #[serde(rename = "timeUnit")]
        time_unit: String,
        value: f64,
    },
}

impl DelayWire {
    fn into_delay(self) -> Delay {
        let millis = match self {
            DelayWire::Millis(ms) => ms as f64,
            DelayWire::Unit { time_unit, value } => match time_unit.as_str() {
                "SECONDS" => value * 1_000.0,
                "MINUTES" => value * 60_000.0,
                _ => value,
            },
        };
        Delay(Duration::from_millis(millis.max(0.0) as u64))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct CannedResponseWire {
    #[serde(default, rename = "statusCode")]
    status_code: Option<u16>,
    #[serde(default)]
    headers: IndexMap<String, OneOrManyWire>,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default)]
    delay: Option<DelayWire>,
}

impl CannedResponseWire {
    fn admit(self) -> CannedResponse {
        let headers = self
            .headers
            .into_iter()
            .map(|(k, v)| (k, v.into_vec()))
            .collect();
        let body = self.body.map(|v| match v {
            Value::String(s) => ResponseBody::String(s),
            other => ResponseBody::Json(other),
        });
        CannedResponse {
            status_code: self.status_code.unwrap_or(200),
            headers,
            body,
            delay: self.delay.map(|d| d.into_delay()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
enum SchemeWire {
    #[default]
    Http,
    Https,
}

impl From<SchemeWire> for Scheme {
    fn from(value: SchemeWire) -> Self {
        match value {
            SchemeWire::Http => Scheme::Http,
            SchemeWire::Https => Scheme::Https,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ForwardWire {
    host: String,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    scheme: SchemeWire,
    #[serde(default)]
    delay: Option<DelayWire>,
}

impl ForwardWire {
    fn admit(self) -> Result<Forward, ValidationError> {
        if self.host.trim().is_empty() {
            return Err(err("httpForward.host must not be empty"));
        }
        let scheme: Scheme = self.scheme.into();
        Ok(Forward {
            host: self.host,
            port: self.port.unwrap_or_else(|| scheme.default_port()),
            scheme,
            delay: self.delay.map(|d| d.into_delay()),
        })
    }
}

/// The full wire shape of an expectation document (spec §3, §6).
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ExpectationWire {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(rename = "httpRequest")]
    pub http_request: RequestMatcherWire,
    #[serde(default, rename = "httpResponse")]
    pub http_response: Option<CannedResponseWire>,
    #[serde(default, rename = "httpForward")]
    pub http_forward: Option<ForwardWire>,
}

impl ExpectationWire {
    /// Validate and normalize into a store-ready `Expectation`. Does not
    /// assign an id — that is the store's job (spec §4.3 "assigns id if
    /// absent").
    pub fn admit(self) -> Result<(Option<String>, i32, RequestMatcher, Action), ValidationError> {
        let action = match (self.http_response, self.http_forward) {
            (Some(_), Some(_)) => {
                return Err(err(
                    "expectation must have exactly one of httpResponse or httpForward",
                ))
            }
            (None, None) => {
                return Err(err(
                    "expectation must have exactly one of httpResponse or httpForward",
                ))
            }
            (Some(response), None) => Action::Response(response.admit()),
            (None, Some(forward)) => Action::Forward(forward.admit()?),
        };

        let matcher = self.http_request.admit()?;
        Ok((self.id, self.priority, matcher, action))
    }
}

/// Serialize an admitted `Expectation` back to its wire shape (persistence
/// file + PUT response, spec §6).
pub fn to_wire(e: &Expectation) -> ExpectationWire {
    let http_request = RequestMatcherWire {
        method: e
            .request_matcher
            .method
            .as_ref()
            .map(|m| FlaggedWire::Flagged {
                value: m.value.clone(),
                not: m.not,
            }),
        path: e.request_matcher.path.as_ref().map(|p| FlaggedWire::Flagged {
            value: path_to_literal(&p.value),
            not: p.not,
        }),
        query_params: e
            .request_matcher
            .query_params
            .as_ref()
            .map(multi_value_to_wire),
        headers: e.request_matcher.headers.as_ref().map(multi_value_to_wire),
        body: e.request_matcher.body.as_ref().map(body_spec_to_wire),
        match_type: match e.request_matcher.match_type {
            MatchType::Strict => MatchTypeWire::Strict,
            MatchType::OnlyMatchingFields => MatchTypeWire::OnlyMatchingFields,
        },
    };

    let (http_response, http_forward) = match &e.action {
        Action::Response(r) => (Some(response_to_wire(r)), None),
        Action::Forward(f) => (None, Some(forward_to_wire(f))),
    };

    ExpectationWire {
        id: Some(e.id.clone()),
        priority: e.priority,
        http_request,
        http_response,
        http_forward,
    }
}

fn path_to_literal(pattern: &PathPattern) -> String {
    match pattern {
        PathPattern::Literal(s) => s.clone(),
        PathPattern::Wildcard(s) => s.clone(),
        PathPattern::Regex(s) => format!("/{}/", s),
    }
}

fn multi_value_to_wire(m: &MultiValueMatcher) -> MultiValueWire {
    let value = m
        .expected
        .iter()
        .map(|(k, values)| {
            let strings: Vec<String> = values
                .iter()
                .map(|v| match v {
                    ExpectedValue::String(s) => s.clone(),
                    ExpectedValue::Regex(s) => s.clone(),
                })
                .collect();
            (k.clone(), OneOrManyWire::Many(strings))
        })
        .collect();
    MultiValueWire::Flagged { value, not: m.not }
}

fn body_spec_to_wire(spec: &BodySpec) -> BodySpecWire {
    let inner = match &spec.value {
        BodyMatcher::String(s) => BodyMatcherWire::String { value: s.clone() },
        BodyMatcher::Json(v) => BodyMatcherWire::Json { value: v.clone() },
        BodyMatcher::JsonPath(s) => BodyMatcherWire::Jsonpath { value: s.clone() },
        BodyMatcher::XPath(s) => BodyMatcherWire::Xpath { value: s.clone() },
        BodyMatcher::Regex(s) => BodyMatcherWire::Regex { value: s.clone() },
    };
    BodySpecWire::Flagged {
        value: Box::new(inner),
        not: spec.not,
    }
}

fn response_to_wire(r: &CannedResponse) -> CannedResponseWire {
    CannedResponseWire {
        status_code: Some(r.status_code),
        headers: r
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), OneOrManyWire::Many(v.clone())))
            .collect(),
        body: r.body.as_ref().map(|b| match b {
            ResponseBody::Json(v) => v.clone(),
            ResponseBody::String(s) => Value::String(s.clone()),
            ResponseBody::Bytes(bytes) => {
                Value::String(String::from_utf8_lossy(bytes).into_owned())
            }
        }),
        delay: r.delay.map(delay_to_wire),
    }
}

fn forward_to_wire(f: &Forward) -> ForwardWire {
    ForwardWire {
        host: f.host.clone(),
        port: Some(f.port),
        scheme: match f.scheme {
            Scheme::Http => SchemeWire::Http,
            Scheme::Https => SchemeWire::Https,
        },
        delay: f.delay.map(delay_to_wire),
    }
}

fn delay_to_wire(d: Delay) -> DelayWire {
    DelayWire::Millis(d.as_duration().as_millis() as u64)
}
