//! Response/forward executor: given a matched expectation and the live
//! request, produces the HTTP reply (spec §4.5).

mod canned;
mod delay;
mod forward;
mod tls;

use std::time::Duration;

use axum::body::Body;
use axum::response::Response;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::config::ServerConfig;
use crate::model::{Action, Expectation, RequestRecord};

/// Owns the shared upstream HTTP client used by the forward path. The
/// connector is `https_or_http` so a single client forwards to either
/// scheme (spec §4.5 step 5).
#[derive(Clone)]
pub struct Executor {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    forward_timeout: Duration,
}

impl Executor {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build(tls::build_connector()),
            forward_timeout: Duration::from_millis(config.forward_timeout_ms),
        }
    }

    pub async fn execute(&self, expectation: &Expectation, request: &RequestRecord) -> Response {
        match &expectation.action {
            Action::Response(response) => canned::respond(response).await,
            Action::Forward(target) => {
                forward::dispatch(&self.client, target, request, self.forward_timeout).await
            }
        }
    }
}
