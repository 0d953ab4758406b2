//! Normalized, validated expectation types (spec §3).
//!
//! These are the types the matcher, index and executor operate on. They
//! are produced from the wire format (`wire.rs`) by admission in
//! `store::validation`, never constructed directly from untrusted input.

use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;

/// A value that may be inverted with a `not` flag (spec §3: method / path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFlag<T> {
    pub value: T,
    pub not: bool,
}

impl<T> ValueFlag<T> {
    pub fn new(value: T) -> Self {
        Self { value, not: false }
    }
}

/// Header/query-name ignored under `STRICT` unless explicitly asserted on
/// (spec §4.1, §9 third Open Question).
pub const STANDARD_HEADER_WHITELIST: &[&str] = &[
    "host",
    "connection",
    "content-length",
    "user-agent",
    "accept",
    "accept-encoding",
    "content-type",
];

/// `request_matcher.match_type` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchType {
    Strict,
    #[default]
    OnlyMatchingFields,
}

/// `path` matcher shape: literal, glob, or `/regex/` (spec §3, §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Literal(String),
    Wildcard(String),
    Regex(String),
}

pub type PathMatcher = ValueFlag<PathPattern>;

/// A single expected value compared string-or-regex against the actual
/// value, per the multi-value matcher in spec §4.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedValue {
    String(String),
    Regex(String),
}

/// `query_params` / `headers` matcher: every expected key must be present,
/// each value tried in turn as string-then-regex (spec §4.1).
#[derive(Debug, Clone, Default)]
pub struct MultiValueMatcher {
    pub expected: IndexMap<String, Vec<ExpectedValue>>,
    pub not: bool,
}

/// `body` matcher variants (spec §3, §4.1).
#[derive(Debug, Clone)]
pub enum BodyMatcher {
    String(String),
    Json(Value),
    JsonPath(String),
    XPath(String),
    Regex(String),
}

pub type BodySpec = ValueFlag<BodyMatcher>;

/// The full request-side matcher of an expectation (spec §3).
#[derive(Debug, Clone, Default)]
pub struct RequestMatcher {
    pub method: Option<ValueFlag<String>>,
    pub path: Option<PathMatcher>,
    pub query_params: Option<MultiValueMatcher>,
    pub headers: Option<MultiValueMatcher>,
    pub body: Option<BodySpec>,
    pub match_type: MatchType,
}

/// A resolved delay (spec §6 "Delay specification").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delay(pub Duration);

impl Delay {
    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

/// `scheme` of a `Forward` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// A canned response action (spec §3).
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status_code: u16,
    /// Multi-valued headers, insertion order preserved.
    pub headers: IndexMap<String, Vec<String>>,
    pub body: Option<ResponseBody>,
    pub delay: Option<Delay>,
}

impl Default for CannedResponse {
    fn default() -> Self {
        Self {
            status_code: 200,
            headers: IndexMap::new(),
            body: None,
            delay: None,
        }
    }
}

/// A canned response body, tagged by how it must be serialized back out
/// (spec §4.5 "write body" rule).
#[derive(Debug, Clone)]
pub enum ResponseBody {
    Json(Value),
    String(String),
    Bytes(Vec<u8>),
}

/// A forward (proxy) action (spec §3).
#[derive(Debug, Clone)]
pub struct Forward {
    pub host: String,
    pub port: u16,
    pub scheme: Scheme,
    pub delay: Option<Delay>,
}

/// The action an expectation takes once matched: exactly one of these
/// (spec §3 invariant "exactly one action kind").
#[derive(Debug, Clone)]
pub enum Action {
    Response(CannedResponse),
    Forward(Forward),
}

/// A fully admitted, indexed expectation (spec §3).
#[derive(Debug, Clone)]
pub struct Expectation {
    pub id: String,
    pub priority: i32,
    pub request_matcher: RequestMatcher,
    pub action: Action,
}

impl Expectation {
    pub fn is_forward(&self) -> bool {
        matches!(self.action, Action::Forward(_))
    }
}
