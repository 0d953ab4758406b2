//! Path matcher: literal, glob wildcard, or `/regex/` form (spec §3, §4.1
//! "Wildcard").

use globset::GlobBuilder;

use crate::model::PathPattern;

use super::string;

pub fn matches(pattern: &PathPattern, actual_path: &str) -> bool {
    match pattern {
        PathPattern::Literal(expected) => expected == actual_path,
        PathPattern::Wildcard(glob_pattern) => GlobBuilder::new(glob_pattern)
            .literal_separator(false)
            .build()
            .map(|g| g.compile_matcher().is_match(actual_path))
            .unwrap_or(false),
        PathPattern::Regex(pattern) => string::matches_regex(pattern, actual_path),
    }
}
