use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::AppState;

// ── GET /api/metrics/report ───────────────────────────────────────────────────

pub async fn get_report(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let metrics = state.metrics.read().await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "sample_count": metrics.entries.len(),
            "operations": metrics.aggregated(),
            "table": metrics.ascii_table(),
        })),
    )
}

// ── GET /api/metrics/export/csv ───────────────────────────────────────────────

pub async fn export_csv(State(state): State<AppState>) -> Response {
    let metrics = state.metrics.read().await;

    match metrics.to_csv() {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"returns_metrics.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "CSV export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": { "code": "export_failed", "message": e.to_string() }
                })),
            )
                .into_response()
        }
    }
}

// ── DELETE /api/metrics ───────────────────────────────────────────────────────

pub async fn clear_metrics(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let mut metrics = state.metrics.write().await;
    let cleared = metrics.entries.len();
    metrics.clear();

    info!(cleared, "Cleared metrics");

    (StatusCode::OK, Json(serde_json::json!({ "cleared": cleared })))
}
