//! Configuration schema: one field per environment variable in spec §6.

use std::path::PathBuf;

/// Root configuration for the mock server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `HOST` — bind address. Default `0.0.0.0`.
    pub host: String,

    /// `PORT` — listen port. Default `1080`.
    pub port: u16,

    /// `LOG_LEVEL` — one of error, warn, info, debug. Default `info`.
    pub log_level: String,

    /// `MAX_HEADER_SIZE_KB` — request body size cap, in KiB. Default `8192`.
    pub max_header_size_kb: usize,

    /// `INITIALIZATION_JSON_PATH` — optional seed file of expectations.
    pub initialization_json_path: Option<PathBuf>,

    /// `WATCH_INITIALIZATION_JSON` — enable the initialization-file watcher.
    pub watch_initialization_json: bool,

    /// `PERSIST_EXPECTATIONS` — toggle persistence entirely. Default `true`.
    pub persist_expectations: bool,

    /// `PERSISTED_EXPECTATIONS_PATH` — target file for the persistence store.
    pub persisted_expectations_path: PathBuf,

    /// `FORWARD_TIMEOUT_MS` — bounded I/O deadline for the forward path.
    /// Default `30000`. There is no global request timeout; this only
    /// bounds the upstream hop.
    pub forward_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1080,
            log_level: "info".to_string(),
            max_header_size_kb: 8192,
            initialization_json_path: None,
            watch_initialization_json: false,
            persist_expectations: true,
            persisted_expectations_path: PathBuf::from("./data/expectations.json"),
            forward_timeout_ms: 30_000,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment, falling back to
    /// the documented default for any variable that is absent or fails to
    /// parse (logging a warning in the latter case).
    pub fn from_env() -> Self {
        super::loader::load()
    }
}
