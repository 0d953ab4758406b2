//! REST control plane: the external collaborator the core must honour
//! (spec §1, §6 "Control-plane HTTP endpoints").

mod error;
mod handlers;

use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;

use crate::config::ServerConfig;
use crate::executor::Executor;
use crate::store::Store;

/// Shared by the control-plane handlers and the request-dispatch
/// fallback, so both live on a single `Router<AppState>` (spec §6 "all
/// share the listener").
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: ServerConfig,
    pub executor: Arc<Executor>,
}

/// The control-plane routes only; the caller adds the expectation-dispatch
/// fallback and calls `.with_state`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/mockserver/expectation",
            put(handlers::put_expectation)
                .get(handlers::list_expectations)
                .delete(handlers::clear_all),
        )
        .route("/mockserver/expectation/active", get(handlers::list_expectations))
        .route(
            "/mockserver/expectation/{id}",
            get(handlers::get_expectation).delete(handlers::delete_expectation),
        )
        .route("/mockserver/clear", put(handlers::clear))
        .route("/mockserver/reset", put(handlers::reset))
        .route("/mockserver/status", put(handlers::status))
}
