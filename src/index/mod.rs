//! Inverted index over expectations, keeping matching sub-linear (spec
//! §4.2).
//!
//! The index is a *must-not-drop-matches* filter: candidate sets may
//! contain expectations that ultimately fail the full matcher, but must
//! never omit one that would pass it.

use std::collections::{HashMap, HashSet};

use crate::model::{Expectation, PathPattern, RequestRecord};

/// Three structures, all keyed by expectation id (spec §4.2).
#[derive(Debug, Default)]
pub struct ExpectationIndex {
    by_method: HashMap<String, HashSet<String>>,
    by_path_prefix: HashMap<String, HashSet<String>>,
    wildcards: HashSet<String>,
}

impl ExpectationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an expectation into the index. Mirrors matcher shape: a
    /// literal method/path narrows the candidate set, anything else (or a
    /// forward action) falls into `wildcards`.
    pub fn insert(&mut self, expectation: &Expectation) {
        let id = expectation.id.clone();

        if let Some(method) = &expectation.request_matcher.method {
            if !method.not {
                self.by_method
                    .entry(method.value.to_ascii_uppercase())
                    .or_default()
                    .insert(id.clone());
            }
        }

        let goes_in_wildcards = expectation.is_forward()
            || match &expectation.request_matcher.path {
                Some(p) if !p.not => !matches!(p.value, PathPattern::Literal(_)),
                _ => true,
            };

        if goes_in_wildcards {
            self.wildcards.insert(id.clone());
        } else if let Some(p) = &expectation.request_matcher.path {
            if let PathPattern::Literal(literal) = &p.value {
                self.by_path_prefix
                    .entry(first_segment(literal).to_string())
                    .or_default()
                    .insert(id.clone());
            }
        }
    }

    /// Remove an expectation from every bucket it may be in. Symmetric
    /// with `insert`: unconditionally scrub, rather than recompute the
    /// shape, so a stale or since-mutated expectation can still be
    /// cleanly de-indexed.
    pub fn remove(&mut self, id: &str) {
        for bucket in self.by_method.values_mut() {
            bucket.remove(id);
        }
        for bucket in self.by_path_prefix.values_mut() {
            bucket.remove(id);
        }
        self.wildcards.remove(id);
    }

    pub fn clear(&mut self) {
        self.by_method.clear();
        self.by_path_prefix.clear();
        self.wildcards.clear();
    }

    /// Candidate set for a request (spec §4.2): union of `by_method`,
    /// `wildcards`, and `by_path_prefix`.
    pub fn candidates(&self, request: &RequestRecord) -> HashSet<String> {
        let mut candidates: HashSet<String> = self.wildcards.clone();

        if let Some(ids) = self.by_method.get(request.method.as_str()) {
            candidates.extend(ids.iter().cloned());
        }

        if let Some(ids) = self.by_path_prefix.get(request.first_path_segment()) {
            candidates.extend(ids.iter().cloned());
        }

        candidates
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.by_method.values().all(|b| b.is_empty())
            && self.by_path_prefix.values().all(|b| b.is_empty())
            && self.wildcards.is_empty()
    }
}

fn first_segment(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or("")
}
