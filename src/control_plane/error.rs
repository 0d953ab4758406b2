//! Control-plane error taxonomy → HTTP status mapping (spec §6, §7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::model::wire::{ValidationError, ValidationKind};

#[derive(Debug)]
pub enum ApiError {
    /// Malformed request body (spec §6 "400 incorrect request format").
    IncorrectFormat(String),
    /// Well-formed but semantically rejected (spec §6 "406 invalid
    /// expectation").
    InvalidExpectation(String),
    /// Unknown expectation id on GET (spec §6 "Return one or 404").
    NotFound,
    /// Unknown expectation id on DELETE (spec §6 "400 if unknown").
    UnknownId,
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        match e.kind {
            ValidationKind::Shape => ApiError::IncorrectFormat(e.message),
            ValidationKind::Semantic => ApiError::InvalidExpectation(e.message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::IncorrectFormat(message) => {
                (StatusCode::BAD_REQUEST, "incorrect request format", message)
            }
            ApiError::InvalidExpectation(message) => {
                (StatusCode::NOT_ACCEPTABLE, "invalid expectation", message)
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "not found",
                "no expectation with that id".to_string(),
            ),
            ApiError::UnknownId => (
                StatusCode::BAD_REQUEST,
                "incorrect request format",
                "no expectation with that id".to_string(),
            ),
        };

        (status, axum::Json(ErrorBody { error, message })).into_response()
    }
}
