use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

mod config;
mod db;
mod error;
mod handlers;
mod lifecycle;
mod metrics;
mod models;
mod seed;

use crate::config::Config;
use crate::db::{InMemoryReturnRepository, PgReturnRepository, ReturnRepository};
use crate::lifecycle::ReturnLifecycle;
use crate::metrics::MetricsStore;

/// Shared application state — cheap to clone (all heap behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<ReturnLifecycle>,
    pub metrics: Arc<RwLock<MetricsStore>>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ReturnRepository>) -> Self {
        Self {
            lifecycle: Arc::new(ReturnLifecycle::new(repo)),
            metrics: Arc::new(RwLock::new(MetricsStore::new())),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,returns_service=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("Returns Service — Rust + Axum");

    let repo: Arc<dyn ReturnRepository> = match &config.database_url {
        Some(url) => {
            info!("Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(url)
                .await?;
            info!("Database connection pool established.");

            info!("Running migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Migrations complete.");

            Arc::new(PgReturnRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; returns are kept in memory only");
            Arc::new(InMemoryReturnRepository::new())
        }
    };

    let app = build_router(AppState::new(repo));

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Returns lifecycle ───────────────────────────────────────────────
        .route(
            "/api/returns",
            get(handlers::returns::list_returns).post(handlers::returns::create_return),
        )
        .route("/api/returns/undo", post(handlers::returns::undo_delete))
        .route("/api/returns/ledger", get(handlers::returns::ledger))
        .route(
            "/api/returns/:id",
            get(handlers::returns::get_return).delete(handlers::returns::delete_return),
        )
        .route(
            "/api/returns/:id/approve",
            post(handlers::returns::approve_return),
        )
        .route(
            "/api/returns/:id/disapprove",
            post(handlers::returns::disapprove_return),
        )

        // ── Seed ────────────────────────────────────────────────────────────
        .route("/api/seed", post(handlers::seed::seed_data))

        // ── Metrics ─────────────────────────────────────────────────────────
        .route("/api/metrics", delete(handlers::metrics::clear_metrics))
        .route("/api/metrics/report", get(handlers::metrics::get_report))
        .route(
            "/api/metrics/export/csv",
            get(handlers::metrics::export_csv),
        )

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
