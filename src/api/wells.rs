//! Well registry endpoints

use axum::extract::{Path, State};
use axum::response::Response;
use serde::Serialize;
use std::sync::Arc;

use super::envelope::ApiResponse;
use super::metrics::MetricListPayload;
use super::ApiContext;
use crate::query::{self, QueryError};
use crate::types::Well;

#[derive(Debug, Serialize)]
pub struct WellListPayload {
    pub wells: Vec<Well>,
    pub total_count: usize,
}

/// GET /wells — every registered well, ordered by id.
pub async fn list_wells(State(ctx): State<Arc<ApiContext>>) -> Result<Response, QueryError> {
    let wells = query::all_wells(&ctx.db).await?;
    Ok(ApiResponse::ok(WellListPayload {
        total_count: wells.len(),
        wells,
    }))
}

/// GET /wells/:well_id — one well's metadata.
pub async fn get_well(
    State(ctx): State<Arc<ApiContext>>,
    Path(well_id): Path<String>,
) -> Result<Response, QueryError> {
    let well = query::well_by_id(&ctx.db, &well_id).await?;
    Ok(ApiResponse::ok(well))
}

/// GET /wells/:well_id/metrics — the metrics that actually have data
/// recorded for this well.
pub async fn list_well_metrics(
    State(ctx): State<Arc<ApiContext>>,
    Path(well_id): Path<String>,
) -> Result<Response, QueryError> {
    let metrics = query::metrics_for_well(&ctx.db, &well_id).await?;
    Ok(ApiResponse::ok(MetricListPayload {
        total_count: metrics.len(),
        metrics,
    }))
}
