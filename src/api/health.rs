//! Service info and health check endpoints

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::ApiContext;

#[derive(Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub health: &'static str,
}

/// GET / — service identification.
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        description: env!("CARGO_PKG_DESCRIPTION"),
        health: "/health",
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub db_connected: bool,
}

/// GET /health — liveness plus a database round-trip.
pub async fn get_health(State(ctx): State<Arc<ApiContext>>) -> Json<HealthResponse> {
    let db_ok = sqlx::query("SELECT 1").fetch_one(&ctx.db).await.is_ok();

    Json(HealthResponse {
        status: if db_ok {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        db_connected: db_ok,
    })
}
