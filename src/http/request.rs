//! Builds the internal `RequestRecord` from an incoming axum request
//! (spec §3 "Request record").

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::model::request::build_record;
use crate::model::RequestRecord;

/// Buffers the body (bounded by `max_body_bytes`) and assembles a
/// `RequestRecord`. Oversized bodies are rejected with 413 before any
/// matcher runs.
pub async fn build_request_record(request: Request<Body>, max_body_bytes: usize) -> Result<RequestRecord, Response> {
    let (parts, body) = request.into_parts();
    let raw_query = parts.uri.query().map(str::to_string);

    let body_bytes: Bytes = axum::body::to_bytes(body, max_body_bytes)
        .await
        .map_err(|_| (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response())?;

    Ok(build_record(
        parts.method,
        parts.uri.path().to_string(),
        raw_query,
        parts.headers,
        body_bytes,
    ))
}
