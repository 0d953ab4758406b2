//! Control-plane request handlers (spec §6).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::model::wire::{to_wire, ExpectationWire};
use crate::store::ClearFilter;

use super::error::ApiError;
use super::AppState;

/// Accepts either a single expectation document or a JSON array of them
/// (spec §6 "Body is an expectation (or array)").
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<ExpectationWire>),
    One(ExpectationWire),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<ExpectationWire> {
        match self {
            OneOrMany::Many(wires) => wires,
            OneOrMany::One(wire) => vec![wire],
        }
    }
}

pub async fn put_expectation(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> Result<Response, ApiError> {
    let batch: OneOrMany = serde_json::from_slice(&body)
        .map_err(|e| ApiError::IncorrectFormat(format!("invalid expectation document: {e}")))?;

    let mut admitted = Vec::new();
    for wire in batch.into_vec() {
        let expectation = state.store.upsert(wire).await?;
        admitted.push(to_wire(&expectation));
    }

    Ok((StatusCode::CREATED, Json(admitted)).into_response())
}

pub async fn list_expectations(State(state): State<AppState>) -> Json<Vec<ExpectationWire>> {
    let expectations = state.store.list().await;
    Json(expectations.iter().map(to_wire).collect())
}

pub async fn get_expectation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExpectationWire>, ApiError> {
    state
        .store
        .get(&id)
        .await
        .map(|e| Json(to_wire(&e)))
        .ok_or(ApiError::NotFound)
}

pub async fn delete_expectation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::UnknownId)
    }
}

pub async fn clear_all(State(state): State<AppState>) -> StatusCode {
    state.store.clear(None).await;
    StatusCode::NO_CONTENT
}

#[derive(Deserialize, Default)]
struct ClearRequestBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

fn parse_clear_filter(body: &[u8]) -> Result<Option<ClearFilter>, ApiError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }

    let parsed: ClearRequestBody = serde_json::from_slice(body)
        .map_err(|e| ApiError::IncorrectFormat(format!("invalid clear filter: {e}")))?;

    if let Some(id) = parsed.id {
        return Ok(Some(ClearFilter::Id(id)));
    }

    if parsed.method.is_some() || parsed.path.is_some() {
        return Ok(Some(ClearFilter::RequestDefinition {
            method: parsed.method,
            path: parsed.path,
        }));
    }

    Ok(None)
}

pub async fn clear(State(state): State<AppState>, body: axum::body::Bytes) -> Result<StatusCode, ApiError> {
    let filter = parse_clear_filter(&body)?;
    state.store.clear(filter).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset(State(state): State<AppState>) -> StatusCode {
    state.store.clear(None).await;
    StatusCode::NO_CONTENT
}

pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "ports": [state.config.port] }))
}
