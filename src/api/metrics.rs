//! Metric catalog endpoints

use axum::extract::State;
use axum::response::Response;
use serde::Serialize;
use std::sync::Arc;

use super::envelope::ApiResponse;
use super::ApiContext;
use crate::query::{self, QueryError};
use crate::types::Metric;

/// Metric list payload, shared with the per-well metrics endpoint.
#[derive(Debug, Serialize)]
pub struct MetricListPayload {
    pub metrics: Vec<Metric>,
    pub total_count: usize,
}

/// GET /metrics — the full metric catalog.
pub async fn list_metrics(State(ctx): State<Arc<ApiContext>>) -> Result<Response, QueryError> {
    let metrics = query::all_metrics(&ctx.db).await?;
    Ok(ApiResponse::ok(MetricListPayload {
        total_count: metrics.len(),
        metrics,
    }))
}
