//! Programmable HTTP mock server.
//!
//! A long-running process that answers client HTTP traffic with canned
//! responses or by forwarding to an upstream, selected by a set of
//! declarative `expectation`s that a REST control plane can add, list,
//! retrieve and clear at runtime.

pub mod config;
pub mod control_plane;
pub mod executor;
pub mod http;
pub mod index;
pub mod lifecycle;
pub mod matchers;
pub mod model;
pub mod observability;
pub mod persistence;
pub mod store;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::Store;
