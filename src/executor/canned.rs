//! Emit a canned response (spec §4.5 "For canned response").

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

use crate::model::{CannedResponse, ResponseBody};

use super::delay;

pub async fn respond(response: &CannedResponse) -> Response {
    delay::sleep_for(response.delay).await;

    let mut builder =
        Response::builder().status(StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::OK));

    let has_content_type = response.headers.keys().any(|k| k.eq_ignore_ascii_case("content-type"));

    // When a header's configured value is a list, emit the first element.
    for (name, values) in &response.headers {
        let Some(first) = values.first() else { continue };
        if let (Ok(header_name), Ok(header_value)) =
            (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(first))
        {
            builder = builder.header(header_name, header_value);
        }
    }

    let body = match &response.body {
        Some(ResponseBody::Json(value)) => {
            if !has_content_type {
                builder = builder.header("content-type", "application/json");
            }
            Body::from(serde_json::to_vec(value).unwrap_or_default())
        }
        Some(ResponseBody::String(s)) => Body::from(s.clone()),
        Some(ResponseBody::Bytes(bytes)) => Body::from(bytes.clone()),
        None => Body::empty(),
    };

    builder.body(body).unwrap_or_else(|_| {
        Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::empty())
            .expect("static fallback response is always valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    #[tokio::test]
    async fn emits_status_and_json_body_with_default_content_type() {
        let mut headers = IndexMap::new();
        headers.insert("x-custom".to_string(), vec!["a".to_string(), "b".to_string()]);
        let response = CannedResponse {
            status_code: 201,
            headers,
            body: Some(ResponseBody::Json(json!({"status": "created"}))),
            delay: None,
        };

        let built = respond(&response).await;
        assert_eq!(built.status(), StatusCode::CREATED);
        assert_eq!(built.headers().get("x-custom").unwrap(), "a");
        assert_eq!(built.headers().get("content-type").unwrap(), "application/json");
    }
}
