//! Configuration loading from the process environment.

use std::path::PathBuf;

use super::schema::ServerConfig;

/// Read a variable and parse it with `f`, falling back to `default` and
/// logging a warning if the variable is set but fails to parse.
fn env_or<T>(name: &str, default: T, f: impl FnOnce(&str) -> Option<T>) -> T {
    match std::env::var(name) {
        Ok(raw) => match f(&raw) {
            Some(value) => value,
            None => {
                tracing::warn!(variable = name, value = %raw, "failed to parse environment variable, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env_or(name, default, |raw| match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

/// Load and return a fully-populated `ServerConfig` from the environment.
pub fn load() -> ServerConfig {
    let defaults = ServerConfig::default();

    ServerConfig {
        host: std::env::var("HOST").unwrap_or(defaults.host),
        port: env_or("PORT", defaults.port, |raw| raw.parse().ok()),
        log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        max_header_size_kb: env_or("MAX_HEADER_SIZE_KB", defaults.max_header_size_kb, |raw| {
            raw.parse().ok()
        }),
        initialization_json_path: std::env::var("INITIALIZATION_JSON_PATH")
            .ok()
            .map(PathBuf::from),
        watch_initialization_json: env_bool(
            "WATCH_INITIALIZATION_JSON",
            defaults.watch_initialization_json,
        ),
        persist_expectations: env_bool("PERSIST_EXPECTATIONS", defaults.persist_expectations),
        persisted_expectations_path: std::env::var("PERSISTED_EXPECTATIONS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.persisted_expectations_path),
        forward_timeout_ms: env_or("FORWARD_TIMEOUT_MS", defaults.forward_timeout_ms, |raw| {
            raw.parse().ok()
        }),
    }
}
