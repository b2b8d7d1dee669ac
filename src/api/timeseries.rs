//! Time-series data endpoints: raw minute windows and aggregated
//! periods.
//!
//! Both handlers funnel their query strings through the typed builders
//! in the query and aggregation layers, so every parameter is validated
//! before any scan runs. Parameters arrive as optional strings and
//! missing ones are reported through the error envelope rather than an
//! extractor rejection.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::envelope::ApiResponse;
use super::ApiContext;
use crate::aggregation::{self, AggregatedQuery, AggregationSummary};
use crate::query::{self, QueryError, RawQuery, RawQuerySummary};
use crate::types::{AggregatedPoint, TimeSeriesPoint};

#[derive(Debug, Deserialize)]
pub struct RawDataParams {
    pub metric_name: Option<String>,
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RawDataPayload {
    pub points: Vec<TimeSeriesPoint>,
    pub summary: RawQuerySummary,
}

/// GET /wells/:well_id/data/raw — minute observations for one metric
/// over an inclusive timestamp window.
pub async fn get_raw_data(
    State(ctx): State<Arc<ApiContext>>,
    Path(well_id): Path<String>,
    Query(params): Query<RawDataParams>,
) -> Result<Response, QueryError> {
    let req = RawQuery::from_params(
        well_id,
        params.metric_name,
        params.start_timestamp,
        params.end_timestamp,
    )?;
    debug!(well_id = %req.well_id, metric = %req.metric_name, "Raw data query");

    let window = query::raw_window(&ctx.db, &req).await?;
    Ok(ApiResponse::ok(RawDataPayload {
        points: window.points,
        summary: window.summary,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AggregatedDataParams {
    pub metric_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub aggregation_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AggregatedDataPayload {
    pub periods: Vec<AggregatedPoint>,
    pub summary: AggregationSummary,
}

/// GET /wells/:well_id/data/aggregated — daily or monthly summaries for
/// one metric over an inclusive date range.
pub async fn get_aggregated_data(
    State(ctx): State<Arc<ApiContext>>,
    Path(well_id): Path<String>,
    Query(params): Query<AggregatedDataParams>,
) -> Result<Response, QueryError> {
    let req = AggregatedQuery::from_params(
        well_id,
        params.metric_name,
        params.start_date,
        params.end_date,
        params.aggregation_type,
    )?;
    debug!(
        well_id = %req.well_id,
        metric = %req.metric_name,
        mode = %req.aggregation,
        "Aggregated data query"
    );

    let window = aggregation::aggregate_window(&ctx.db, &req).await?;
    Ok(ApiResponse::ok(AggregatedDataPayload {
        periods: window.periods,
        summary: window.summary,
    }))
}
