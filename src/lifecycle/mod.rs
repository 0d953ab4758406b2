//! Process lifecycle: signal handling and graceful shutdown broadcast
//! (spec §5 "Graceful shutdown").
//!
//! # Shutdown Sequence
//! 1. SIGTERM/SIGINT received
//! 2. Broadcast fires; the HTTP server stops accepting new connections
//!    and lets `axum::serve` drain in-flight handlers
//! 3. The initialization-file watcher task observes the same broadcast
//!    and exits its poll loop
//! 4. Process exits

mod shutdown;
mod signals;

pub use shutdown::Shutdown;
