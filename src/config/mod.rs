//! Server configuration, loaded once at startup from the environment.
//!
//! # Data Flow
//! ```text
//! environment variables
//!     → schema.rs (typed fields, documented defaults)
//!     → loader.rs (parse, fall back to default + warn on bad values)
//!     → ServerConfig (immutable for the lifetime of the process)
//! ```
//!
//! # Design Decisions
//! - Every field has a default; a completely empty environment is a valid
//!   configuration.
//! - Parse failures are not fatal: they are logged and the documented
//!   default is used, matching the source ecosystem's tolerant config
//!   loading.

mod loader;
mod schema;

pub use schema::ServerConfig;
