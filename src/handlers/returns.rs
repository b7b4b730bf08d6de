use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;

use super::observe;
use crate::{
    error::AppResult,
    models::{ApproveReturn, CreateReturn},
    AppState,
};

type JsonResponse = AppResult<(StatusCode, Json<serde_json::Value>)>;

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_returns(State(state): State<AppState>) -> JsonResponse {
    let start = Instant::now();
    let result = state.lifecycle.list_all().await;
    observe(&state, "list", start, &result).await;
    let returns = result?;
    let elapsed = start.elapsed();

    info!(count = returns.len(), "Listed returns");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": returns,
            "count": returns.len(),
            "query_time_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_return(
    State(state): State<AppState>,
    payload: Result<Json<CreateReturn>, JsonRejection>,
) -> JsonResponse {
    let Json(payload) = payload?;

    let start = Instant::now();
    let result = state.lifecycle.create(&payload.item, &payload.reason).await;
    observe(&state, "create", start, &result).await;
    let record = result?;
    let elapsed = start.elapsed();

    info!(id = record.id, item = %record.item, "Created return");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "data": record,
            "db_time_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_return(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> JsonResponse {
    let Path(id) = id?;

    let start = Instant::now();
    let result = state.lifecycle.get(id).await;
    observe(&state, "get", start, &result).await;
    let record = result?;
    let elapsed = start.elapsed();

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": record,
            "query_time_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}

// ── Approve / disapprove ──────────────────────────────────────────────────────

pub async fn approve_return(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ApproveReturn>, JsonRejection>,
) -> JsonResponse {
    let Path(id) = id?;
    let Json(payload) = payload?;

    let start = Instant::now();
    let result = state.lifecycle.approve(id, &payload.resolution).await;
    observe(&state, "approve", start, &result).await;
    let record = result?;
    let elapsed = start.elapsed();

    info!(id, resolution = %payload.resolution, "Approved return");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": record,
            "db_time_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}

pub async fn disapprove_return(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> JsonResponse {
    let Path(id) = id?;

    let start = Instant::now();
    let result = state.lifecycle.disapprove(id).await;
    observe(&state, "disapprove", start, &result).await;
    let record = result?;
    let elapsed = start.elapsed();

    info!(id, "Disapproved return");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": record,
            "db_time_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}

// ── Delete / undo ─────────────────────────────────────────────────────────────

pub async fn delete_return(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> JsonResponse {
    let Path(id) = id?;

    let start = Instant::now();
    let result = state.lifecycle.delete(id).await;
    observe(&state, "delete", start, &result).await;
    let id = result?;
    let elapsed = start.elapsed();

    info!(id, "Deleted return");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": format!("Return with ID {} deleted", id),
            "id": id,
            "db_time_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}

pub async fn undo_delete(State(state): State<AppState>) -> JsonResponse {
    let start = Instant::now();
    let result = state.lifecycle.undo_delete().await;
    observe(&state, "undo", start, &result).await;
    let record = result?;
    let elapsed = start.elapsed();

    info!(id = record.id, "Restored deleted return");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "data": record,
            "db_time_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}

pub async fn ledger(State(state): State<AppState>) -> JsonResponse {
    let start = Instant::now();
    let result = state.lifecycle.ledger().await;
    observe(&state, "ledger", start, &result).await;
    let snapshot = result?;
    Ok((StatusCode::OK, Json(serde_json::json!({ "data": snapshot }))))
}
