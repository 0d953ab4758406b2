//! Structured logging (spec SPEC_FULL.md ambient stack: `tracing` +
//! `tracing-subscriber`).
//!
//! # Design Decisions
//! - `EnvFilter` lets `RUST_LOG` override `LOG_LEVEL` for ad-hoc debugging
//!   without touching configuration.
//! - A single global subscriber, installed once at startup; no per-request
//!   logger instances.

mod logging;

pub use logging::init;
