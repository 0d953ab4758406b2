//! Forward (proxy) dispatch (spec §4.5 "For forward").

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use serde_json::json;
use tower::{Service, ServiceBuilder, ServiceExt};
use tower_http::timeout::TimeoutLayer;

use crate::model::{Forward, RequestRecord};

use super::delay;

const HOP_BY_HOP: &[&str] = &["host", "connection", "content-length"];

/// Dispatches the forward (proxy) action, bounding the upstream hop with
/// `timeout` (spec §5 "the forward path may enforce a bounded I/O
/// deadline").
pub async fn dispatch(
    client: &Client<HttpsConnector<HttpConnector>, Body>,
    forward: &Forward,
    request: &RequestRecord,
    timeout: Duration,
) -> Response {
    delay::sleep_for(forward.delay).await;

    let uri = match build_uri(forward, request) {
        Some(uri) => uri,
        None => return upstream_error("failed to build forward target URL"),
    };

    let mut builder = Request::builder().method(request.method.clone()).uri(uri);
    for (name, value) in request.headers.iter() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        builder = builder.header(name, value);
    }
    builder = builder.header(axum::http::header::HOST, forward.host.as_str());

    let outgoing = match builder.body(Body::from(request.raw_body.clone())) {
        Ok(req) => req,
        Err(_) => return upstream_error("failed to build forward request"),
    };

    let mut bounded = ServiceBuilder::new()
        .layer(TimeoutLayer::new(timeout))
        .service(client.clone());

    let result = match bounded.ready().await {
        Ok(ready) => ready.call(outgoing).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(upstream_response) => {
            let (parts, body) = upstream_response.into_parts();
            let mut response_builder = Response::builder().status(parts.status);
            for (name, value) in parts.headers.iter() {
                if name == axum::http::header::CONNECTION || name == axum::http::header::TRANSFER_ENCODING {
                    continue;
                }
                response_builder = response_builder.header(name, value);
            }
            response_builder
                .body(Body::new(body))
                .unwrap_or_else(|_| upstream_error("failed to relay upstream response"))
        }
        Err(e) => {
            tracing::warn!(error = %e, host = %forward.host, "forward upstream request failed");
            upstream_error(&format!("upstream request failed: {e}"))
        }
    }
}

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.contains(&name) || name.starts_with("x-forwarded-") || name == "x-real-ip"
}

/// `<scheme>://<host>[:<port>]<path>[?<query>]`, omitting the port when
/// it is the scheme default, preserving the raw query byte-for-byte when
/// available (spec §4.5).
fn build_uri(forward: &Forward, request: &RequestRecord) -> Option<Uri> {
    let mut url = format!("{}://{}", forward.scheme.as_str(), forward.host);
    if forward.port != forward.scheme.default_port() {
        url.push(':');
        url.push_str(&forward.port.to_string());
    }
    url.push_str(&request.path);

    if let Some(query) = &request.raw_query {
        url.push('?');
        url.push_str(query);
    } else if !request.query.is_empty() {
        url.push('?');
        url.push_str(&rebuild_query(request));
    }

    url.parse().ok()
}

fn rebuild_query(request: &RequestRecord) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(request.query_pairs())
        .finish()
}

fn upstream_error(message: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        axum::Json(json!({"error": "forward failed", "message": message})),
    )
        .into_response()
}
