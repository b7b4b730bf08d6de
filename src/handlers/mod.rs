pub mod metrics;
pub mod returns;
pub mod seed;

use std::time::Instant;

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::{error::AppResult, metrics::MetricEntry, AppState};

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "service": "returns-service" })))
}

/// Record how long `operation` took and whether it failed.
pub(crate) async fn observe<T>(
    state: &AppState,
    operation: &str,
    start: Instant,
    result: &AppResult<T>,
) {
    let elapsed = start.elapsed();
    let code = result.as_ref().err().map(|e| e.code());
    state.metrics.write().await.record(MetricEntry::new(
        operation,
        elapsed.as_nanos() as u64,
        code,
    ));
}
