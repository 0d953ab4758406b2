//! HTTP framing layer: merges the control plane and the expectation
//! dispatch fallback onto a single listener (spec §6 "all share the
//! listener").

pub mod request;
mod request_id;
mod server;

pub use server::HttpServer;
