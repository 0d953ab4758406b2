//! Initialization-file loader: an operator-provided seed file, read once
//! at startup and optionally watched (spec §4.4 "Initialization-file
//! loader").

use std::fs;
use std::path::Path;

use crate::model::wire::ExpectationWire;
use crate::model::Expectation;
use crate::store::admit;

use super::PersistenceError;

/// Read, validate each expectation individually, insert valid ones, skip
/// and count invalid ones (startup behaviour: additive, tolerant of a
/// partially-broken file).
pub fn load_and_validate(path: &Path) -> Result<(Vec<Expectation>, usize), PersistenceError> {
    let (wires, skipped_parse) = parse_lenient(path)?;
    let mut expectations = Vec::with_capacity(wires.len());
    let mut skipped = skipped_parse;

    for wire in wires {
        match admit(wire) {
            Ok(e) => expectations.push(e),
            Err(e) => {
                tracing::warn!(error = %e, "skipping invalid expectation in initialization file");
                skipped += 1;
            }
        }
    }

    Ok((expectations, skipped))
}

/// Read and validate the whole file as a single all-or-nothing batch, for
/// the watcher's reload (spec §4.4 "parse → validate all").
pub fn parse_and_validate_strict(path: &Path) -> Result<Vec<Expectation>, PersistenceError> {
    let raw = fs::read_to_string(path)?;
    let wires: Vec<ExpectationWire> = serde_json::from_str(&raw)?;
    let mut expectations = Vec::with_capacity(wires.len());
    for wire in wires {
        expectations.push(admit(wire)?);
    }
    Ok(expectations)
}

/// Best-effort parse: a document that is not valid JSON at all yields no
/// expectations and is reported as entirely skipped, rather than failing
/// startup.
fn parse_lenient(path: &Path) -> Result<(Vec<ExpectationWire>, usize), PersistenceError> {
    let raw = fs::read_to_string(path)?;
    match serde_json::from_str::<Vec<ExpectationWire>>(&raw) {
        Ok(wires) => Ok((wires, 0)),
        Err(e) => {
            tracing::warn!(error = %e, "initialization file is not a valid JSON array, skipping entirely");
            Ok((Vec::new(), 1))
        }
    }
}
