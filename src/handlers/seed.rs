use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{error::AppResult, seed, AppState};

#[derive(Debug, Deserialize)]
pub struct SeedParams {
    /// Number of returns to create (default: 100, max: 1 000)
    pub count: Option<usize>,
}

// ── POST /api/seed ────────────────────────────────────────────────────────────

pub async fn seed_data(
    State(state): State<AppState>,
    params: Result<Query<SeedParams>, QueryRejection>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let Query(params) = params?;
    let count = params.count.unwrap_or(100).min(1_000);

    let start = Instant::now();
    let created = seed::seed_returns(&state.lifecycle, count).await?;
    let seed_elapsed = start.elapsed();

    let total = state.lifecycle.list_all().await?.len();

    info!(
        seeded = created.len(),
        total,
        seed_ms = seed_elapsed.as_millis(),
        "Seeding complete"
    );

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "seeded": created.len(),
            "total": total,
            "first_id": created.first().map(|r| r.id),
            "last_id": created.last().map(|r| r.id),
            "seed_time_ms": seed_elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}
