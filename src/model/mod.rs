//! Expectation data model (spec §3).
//!
//! # Data Flow
//! ```text
//! PUT body / initialization file (JSON)
//!     → wire.rs (serde structs matching the on-the-wire shape)
//!     → expectation.rs (normalized, validated, id-assigned Expectation)
//!     → stored, indexed, matched
//! ```
//!
//! # Design Decisions
//! - The wire format tolerates "string or `{value, not}`" duck typing
//!   (source pattern #2 in spec §9); `wire.rs` absorbs that and hands
//!   `expectation.rs` a single normalized tagged-enum shape.

pub mod expectation;
pub mod request;
pub mod wire;

pub use expectation::{
    Action, BodyMatcher, BodySpec, CannedResponse, Expectation, ExpectedValue, Forward, MatchType,
    MultiValueMatcher, PathMatcher, PathPattern, RequestMatcher, ResponseBody, Scheme,
    STANDARD_HEADER_WHITELIST, ValueFlag,
};
pub use request::RequestRecord;
