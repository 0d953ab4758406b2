//! Request ID tagging, reused in spirit from the teacher's
//! `http::request::RequestIdLayer` (present there only as a doc stub — this
//! is the real implementation, grounded on its call site in
//! `http/server.rs`: `.layer(RequestIdLayer)` ahead of the trace layer, and
//! on the `x-request-id` header its handlers read and write) and on the
//! `axum::middleware::from_fn` shape the teacher actually uses for request
//! middleware (`http/middleware/access_control.rs`).
//!
//! A request's id is taken from an inbound `x-request-id` header when the
//! caller already has one (so a request can be correlated across a chain
//! of proxies), otherwise a fresh UUID v4 is minted. Either way the id is
//! stashed in request extensions for handlers and echoed back on the
//! response so callers can log it.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

const HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

pub async fn tag_request(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(HEADER, value);
    }
    response
}
