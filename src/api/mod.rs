//! REST API module using Axum
//!
//! Read-only HTTP surface over the synthetic well dataset:
//! - Registry endpoints for wells and the metric catalog
//! - Raw minute-window and aggregated period queries
//! - Consistent response envelope with structured error codes

pub mod envelope;
pub mod health;
pub mod metrics;
pub mod timeseries;
pub mod wells;

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

/// Shared read-only state injected into every handler.
pub struct ApiContext {
    pub db: SqlitePool,
    pub config: AppConfig,
}

impl ApiContext {
    pub fn new(db: SqlitePool, config: AppConfig) -> Arc<Self> {
        Arc::new(Self { db, config })
    }
}

/// Build the complete API router
pub fn build_router(ctx: Arc<ApiContext>) -> Router {
    Router::new()
        .route("/", axum::routing::get(health::service_info))
        .route("/health", axum::routing::get(health::get_health))
        // Well registry
        .route("/wells", axum::routing::get(wells::list_wells))
        .route("/wells/:well_id", axum::routing::get(wells::get_well))
        .route(
            "/wells/:well_id/metrics",
            axum::routing::get(wells::list_well_metrics),
        )
        // Metric catalog
        .route("/metrics", axum::routing::get(metrics::list_metrics))
        // Time-series data
        .route(
            "/wells/:well_id/data/raw",
            axum::routing::get(timeseries::get_raw_data),
        )
        .route(
            "/wells/:well_id/data/aggregated",
            axum::routing::get(timeseries::get_aggregated_data),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
