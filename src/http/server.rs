//! HTTP server setup: control plane plus expectation dispatch, one
//! listener, graceful shutdown (spec §5, §6).

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::control_plane::{self, AppState};
use crate::executor::Executor;
use crate::store::Store;

use super::request::build_request_record;
use super::request_id::{tag_request, RequestId};

pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    pub fn new(store: Arc<Store>, config: ServerConfig) -> Self {
        let executor = Arc::new(Executor::new(&config));
        let state = AppState {
            store,
            config,
            executor,
        };
        Self { state }
    }

    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let max_body_bytes = self.state.config.max_header_size_kb.saturating_mul(1024);

        let app = control_plane::router()
            .fallback(dispatch_handler)
            .with_state(self.state)
            .layer(axum::extract::DefaultBodyLimit::max(max_body_bytes.max(1)))
            .layer(axum::middleware::from_fn(tag_request))
            .layer(TraceLayer::new_for_http());

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server initiating graceful shutdown");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every request that doesn't match a control-plane route is dispatched
/// against the expectation store (spec §2 "Data flow for a client
/// request").
async fn dispatch_handler(
    State(state): State<AppState>,
    axum::Extension(request_id): axum::Extension<RequestId>,
    request: Request,
) -> Response {
    let max_body_bytes = state.config.max_header_size_kb.saturating_mul(1024).max(1);

    let record = match build_request_record(request, max_body_bytes).await {
        Ok(record) => record,
        Err(rejection) => return rejection,
    };

    match state.store.find(&record).await {
        Some(expectation) => state.executor.execute(&expectation, &record).await,
        None => {
            let RequestId(request_id) = request_id;
            tracing::warn!(request_id = %request_id, path = %record.path, "no matching expectation");
            (
                StatusCode::NOT_FOUND,
                axum::Json(json!({"error": "no matching expectation"})),
            )
                .into_response()
        }
    }
}

