//! Admission gate (spec §4.3 "Validation").

use crate::model::wire::{ExpectationWire, ValidationError};
use crate::model::{Expectation, RequestMatcher};

/// Validate and normalize a wire document into a store-ready `Expectation`,
/// without assigning an id — the caller decides id policy (spec §4.3
/// "assigns id if absent").
pub fn admit(wire: ExpectationWire) -> Result<Expectation, ValidationError> {
    let (id, priority, request_matcher, action) = wire.admit()?;
    check_body_compiles(&request_matcher)?;

    Ok(Expectation {
        id: id.unwrap_or_default(),
        priority,
        request_matcher,
        action,
    })
}

/// Compile-check regex and jsonpath/xpath expressions eagerly at admission
/// time so a malformed matcher is rejected up front rather than silently
/// treated as "never matches" at request time (spec §4.3 "regex compiles;
/// JSONPath/XPath parse").
fn check_body_compiles(matcher: &RequestMatcher) -> Result<(), ValidationError> {
    use crate::model::BodyMatcher;

    if let Some(path) = &matcher.path {
        if let crate::model::PathPattern::Regex(pattern) = &path.value {
            regex::Regex::new(pattern)
                .map_err(|e| ValidationError::semantic(format!("invalid path regex: {e}")))?;
        }
    }

    if let Some(body) = &matcher.body {
        match &body.value {
            BodyMatcher::Regex(pattern) => {
                regex::Regex::new(pattern)
                    .map_err(|e| ValidationError::semantic(format!("invalid body regex: {e}")))?;
            }
            BodyMatcher::JsonPath(expr) => {
                if expr.trim().is_empty() {
                    return Err(ValidationError::semantic("empty jsonpath expression"));
                }
            }
            BodyMatcher::XPath(expr) => {
                if sxd_xpath::Factory::new().build(expr).is_err() {
                    return Err(ValidationError::semantic(format!("invalid xpath expression: {expr}")));
                }
            }
            _ => {}
        }
    }

    Ok(())
}
