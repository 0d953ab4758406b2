//! Atomic, locked persistence of the expectation set, plus the optional
//! initialization-file loader and watcher (spec §4.4).
//!
//! Two independent files are in play and must not be confused: the
//! *persistence file* (this engine's own durable copy, read/written by
//! `file_store`) and the *initialization file* (an operator-provided
//! seed, read by `init_file` and optionally watched for changes).

pub mod file_store;
pub mod init_file;
pub mod init_watcher;

use crate::model::wire::ValidationError;

pub use init_watcher::watch_initialization_file;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}
