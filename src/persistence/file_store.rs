//! Load/save of the persistence file: a JSON array of expectation
//! documents, pretty-printed (spec §6 "Persistence file format").

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use tempfile::NamedTempFile;

use crate::model::wire::ExpectationWire;
use crate::model::Expectation;
use crate::store::admit;

use super::PersistenceError;

/// Acquire a shared advisory lock, read, parse, validate. Absent file is
/// an empty store, not an error (spec §4.4 "Load").
pub fn load(path: &Path) -> Result<Vec<Expectation>, PersistenceError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut file = File::open(path)?;
    FileExt::lock_shared(&file)?;
    let mut contents = String::new();
    let read_result = file.read_to_string(&mut contents);
    let _ = FileExt::unlock(&file);
    read_result?;

    let wires: Vec<ExpectationWire> = serde_json::from_str(&contents)?;
    let mut expectations = Vec::with_capacity(wires.len());
    for wire in wires {
        expectations.push(admit(wire)?);
    }
    Ok(expectations)
}

/// Acquire an exclusive advisory lock on a sidecar lock file, marshal,
/// write-temp-and-rename for atomicity (spec §4.4 "Save").
pub fn save(path: &Path, expectations: &[Expectation]) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let lock_file = File::create(lock_path(path))?;
    FileExt::lock_exclusive(&lock_file)?;

    let result = (|| -> Result<(), PersistenceError> {
        let wires: Vec<ExpectationWire> = expectations.iter().map(crate::model::wire::to_wire).collect();
        let json = serde_json::to_string_pretty(&wires)?;

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| PersistenceError::Io(e.error))?;
        Ok(())
    })();

    let _ = FileExt::unlock(&lock_file);
    result
}

fn lock_path(path: &Path) -> PathBuf {
    let mut lock = path.as_os_str().to_owned();
    lock.push(".lock");
    PathBuf::from(lock)
}
