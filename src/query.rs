//! Read-side query layer: registry lookups, raw window scans, and the
//! boundary validation that turns untrusted request parameters into
//! typed queries.
//!
//! Validation happens before any range scan executes. Identifier checks
//! hit the registry tables; the time range is checked at parse time, so
//! an inverted window never reaches SQLite.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::types::{Metric, QualityFlag, TimeSeriesPoint, Well};

/// Stored timestamp layout. Lexicographic order matches chronological
/// order, which is what makes `BETWEEN` range scans on the text column
/// correct.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// ============================================================================
// Errors
// ============================================================================

/// Failures surfaced by the query layer. The HTTP layer maps these onto
/// status codes: unknown identifiers become 404, rejected parameters
/// become 400, and storage failures become 500.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Well not found: {0}")]
    WellNotFound(String),
    #[error("Metric not found: {0}")]
    MetricNotFound(String),
    #[error("{0}")]
    InvalidParameter(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ============================================================================
// Boundary parsing
// ============================================================================

/// A validated raw-data request: identifiers plus a UTC minute window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuery {
    pub well_id: String,
    pub metric_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RawQuery {
    /// Builds a validated query from raw request parameters. Missing
    /// parameters, unparseable timestamps, and inverted ranges are all
    /// rejected here.
    pub fn from_params(
        well_id: String,
        metric_name: Option<String>,
        start_timestamp: Option<String>,
        end_timestamp: Option<String>,
    ) -> Result<Self, QueryError> {
        let metric_name = required(metric_name, "metric_name")?;
        let start = parse_timestamp(&required(start_timestamp, "start_timestamp")?)?;
        let end = parse_timestamp(&required(end_timestamp, "end_timestamp")?)?;

        if start >= end {
            return Err(QueryError::InvalidParameter(
                "start_timestamp must be before end_timestamp".to_string(),
            ));
        }

        Ok(Self { well_id, metric_name, start, end })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, QueryError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(QueryError::InvalidParameter(format!("{name} is required"))),
    }
}

/// Parses an ISO 8601 UTC timestamp. Accepts an explicit offset
/// (`2025-01-15T00:00:00Z`, `...+00:00`) or a bare wall-clock form,
/// which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, QueryError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    Err(QueryError::InvalidParameter(format!(
        "invalid timestamp '{raw}': expected ISO 8601 UTC, e.g. 2025-01-15T00:00:00Z"
    )))
}

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(raw: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        QueryError::InvalidParameter(format!("invalid date '{raw}': expected YYYY-MM-DD"))
    })
}

/// Formats a timestamp in the stored layout.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

// ============================================================================
// Registry lookups
// ============================================================================

/// All wells, ordered by id.
pub async fn all_wells(pool: &SqlitePool) -> Result<Vec<Well>, QueryError> {
    let wells = sqlx::query_as::<_, Well>(
        "SELECT well_id, well_name, latitude, longitude, operator, \
                field_name, well_type, spud_date, data_start_date, data_end_date \
         FROM wells ORDER BY well_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(wells)
}

/// A single well by id.
pub async fn well_by_id(pool: &SqlitePool, well_id: &str) -> Result<Well, QueryError> {
    sqlx::query_as::<_, Well>(
        "SELECT well_id, well_name, latitude, longitude, operator, \
                field_name, well_type, spud_date, data_start_date, data_end_date \
         FROM wells WHERE well_id = ?",
    )
    .bind(well_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| QueryError::WellNotFound(well_id.to_string()))
}

/// The full metric catalog, ordered by name.
pub async fn all_metrics(pool: &SqlitePool) -> Result<Vec<Metric>, QueryError> {
    let metrics = sqlx::query_as::<_, Metric>(
        "SELECT metric_name, display_name, description, unit_of_measurement, \
                data_type, typical_min, typical_max \
         FROM metrics ORDER BY metric_name",
    )
    .fetch_all(pool)
    .await?;
    Ok(metrics)
}

/// Metrics that have at least one observation recorded for the well.
pub async fn metrics_for_well(pool: &SqlitePool, well_id: &str) -> Result<Vec<Metric>, QueryError> {
    ensure_well_exists(pool, well_id).await?;
    let metrics = sqlx::query_as::<_, Metric>(
        "SELECT m.metric_name, m.display_name, m.description, m.unit_of_measurement, \
                m.data_type, m.typical_min, m.typical_max \
         FROM metrics m \
         WHERE EXISTS (SELECT 1 FROM timeseries_data t \
                       WHERE t.well_id = ? AND t.metric_name = m.metric_name) \
         ORDER BY m.metric_name",
    )
    .bind(well_id)
    .fetch_all(pool)
    .await?;
    Ok(metrics)
}

/// Errors with [`QueryError::WellNotFound`] unless the well is registered.
pub async fn ensure_well_exists(pool: &SqlitePool, well_id: &str) -> Result<(), QueryError> {
    let found = sqlx::query("SELECT 1 FROM wells WHERE well_id = ?")
        .bind(well_id)
        .fetch_optional(pool)
        .await?;
    if found.is_none() {
        return Err(QueryError::WellNotFound(well_id.to_string()));
    }
    Ok(())
}

/// The unit for a metric; doubles as the metric existence check.
pub async fn metric_unit(pool: &SqlitePool, metric_name: &str) -> Result<String, QueryError> {
    sqlx::query_scalar::<_, String>("SELECT unit_of_measurement FROM metrics WHERE metric_name = ?")
        .bind(metric_name)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| QueryError::MetricNotFound(metric_name.to_string()))
}

// ============================================================================
// Raw window scans
// ============================================================================

/// Points plus the summary block for one raw-data response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWindow {
    pub points: Vec<TimeSeriesPoint>,
    pub summary: RawQuerySummary,
}

/// Echo of the query plus count and completeness against the expected
/// minute cadence.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RawQuerySummary {
    pub well_id: String,
    pub metric_name: String,
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub total_points: usize,
    pub data_completeness: f64,
}

/// Scans one (well, metric) minute window, both endpoints inclusive,
/// ordered by timestamp. An empty window for a valid query is not an
/// error; it reports zero points and zero completeness.
pub async fn raw_window(pool: &SqlitePool, req: &RawQuery) -> Result<RawWindow, QueryError> {
    ensure_well_exists(pool, &req.well_id).await?;
    let unit = metric_unit(pool, &req.metric_name).await?;

    let start_text = format_timestamp(&req.start);
    let end_text = format_timestamp(&req.end);

    let rows = sqlx::query_as::<_, (String, f64, QualityFlag)>(
        "SELECT timestamp, value, quality_flag FROM timeseries_data \
         WHERE well_id = ? AND metric_name = ? AND timestamp BETWEEN ? AND ? \
         ORDER BY timestamp",
    )
    .bind(&req.well_id)
    .bind(&req.metric_name)
    .bind(&start_text)
    .bind(&end_text)
    .fetch_all(pool)
    .await?;

    let points: Vec<TimeSeriesPoint> = rows
        .into_iter()
        .map(|(timestamp, value, quality_flag)| TimeSeriesPoint {
            timestamp,
            well_id: req.well_id.clone(),
            metric_name: req.metric_name.clone(),
            value,
            unit: unit.clone(),
            quality_flag,
        })
        .collect();

    let expected = expected_minute_points(&req.start, &req.end);
    let summary = RawQuerySummary {
        well_id: req.well_id.clone(),
        metric_name: req.metric_name.clone(),
        start_timestamp: start_text,
        end_timestamp: end_text,
        total_points: points.len(),
        data_completeness: completeness(points.len(), expected),
    };

    Ok(RawWindow { points, summary })
}

// ============================================================================
// Completeness math
// ============================================================================

/// Expected observations for a minute-cadence window, both endpoints
/// inclusive.
pub fn expected_minute_points(start: &DateTime<Utc>, end: &DateTime<Utc>) -> i64 {
    (*end - *start).num_seconds() / 60 + 1
}

/// Percentage of expected points actually present, clamped to [0, 100]
/// and rounded to two decimals. A window expecting nothing scores zero.
pub fn completeness(actual: usize, expected: i64) -> f64 {
    if expected <= 0 {
        return 0.0;
    }
    let pct = actual as f64 / expected as f64 * 100.0;
    round2(pct.clamp(0.0, 100.0))
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::types::WellType;
    use chrono::NaiveDate;

    fn ts(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn parses_utc_timestamps() {
        assert_eq!(
            format_timestamp(&ts("2025-01-15T06:30:00Z")),
            "2025-01-15T06:30:00Z"
        );
        assert_eq!(
            format_timestamp(&ts("2025-01-15T06:30:00+00:00")),
            "2025-01-15T06:30:00Z"
        );
        assert_eq!(
            format_timestamp(&ts("2025-01-15T06:30:00")),
            "2025-01-15T06:30:00Z"
        );
    }

    #[test]
    fn rejects_malformed_timestamps() {
        for raw in ["not-a-date", "2025-13-40T00:00:00Z", "2025-01-15", ""] {
            let err = parse_timestamp(raw).unwrap_err();
            assert!(matches!(err, QueryError::InvalidParameter(_)), "{raw}");
        }
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("2025-01-15").is_ok());
        assert!(matches!(
            parse_date("15/01/2025"),
            Err(QueryError::InvalidParameter(_))
        ));
    }

    #[test]
    fn raw_query_requires_all_parameters() {
        let err = RawQuery::from_params(
            "WELL-001".into(),
            None,
            Some("2025-01-01T00:00:00Z".into()),
            Some("2025-01-02T00:00:00Z".into()),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "metric_name is required");

        let err = RawQuery::from_params(
            "WELL-001".into(),
            Some("oil_production_rate".into()),
            None,
            Some("2025-01-02T00:00:00Z".into()),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "start_timestamp is required");
    }

    #[test]
    fn raw_query_rejects_inverted_and_equal_ranges() {
        for (start, end) in [
            ("2025-01-02T00:00:00Z", "2025-01-01T00:00:00Z"),
            ("2025-01-01T00:00:00Z", "2025-01-01T00:00:00Z"),
        ] {
            let err = RawQuery::from_params(
                "WELL-001".into(),
                Some("oil_production_rate".into()),
                Some(start.into()),
                Some(end.into()),
            )
            .unwrap_err();
            assert_eq!(err.to_string(), "start_timestamp must be before end_timestamp");
        }
    }

    #[test]
    fn expected_points_counts_inclusive_minutes() {
        let start = ts("2025-01-15T00:00:00Z");
        let end = ts("2025-01-15T01:00:00Z");
        assert_eq!(expected_minute_points(&start, &end), 61);

        let one_day = ts("2025-01-16T00:00:00Z");
        assert_eq!(expected_minute_points(&start, &one_day), 1441);
    }

    #[test]
    fn completeness_rounds_and_clamps() {
        assert_eq!(completeness(10, 11), 90.91);
        assert_eq!(completeness(11, 11), 100.0);
        assert_eq!(completeness(0, 11), 0.0);
        assert_eq!(completeness(12, 11), 100.0);
        assert_eq!(completeness(5, 0), 0.0);
    }

    // ------------------------------------------------------------------
    // Storage-backed tests
    // ------------------------------------------------------------------

    async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = db::create_pool(&dir.path().join("query_test.db"), 2)
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();
        (dir, pool)
    }

    async fn insert_well(pool: &SqlitePool, well_id: &str) {
        sqlx::query(
            "INSERT INTO wells (well_id, well_name, latitude, longitude, operator, \
             field_name, well_type, spud_date, data_start_date, data_end_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(well_id)
        .bind("North Field A 1")
        .bind(29.0)
        .bind(-95.0)
        .bind("Demo Energy Corp")
        .bind("North Field")
        .bind(WellType::Producer)
        .bind(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .bind(NaiveDate::from_ymd_opt(2024, 12, 9).unwrap())
        .bind(NaiveDate::from_ymd_opt(2025, 12, 9).unwrap())
        .execute(pool)
        .await
        .unwrap();
    }

    async fn insert_metric(pool: &SqlitePool, name: &str, unit: &str) {
        sqlx::query(
            "INSERT INTO metrics (metric_name, display_name, description, \
             unit_of_measurement, data_type, typical_min, typical_max) \
             VALUES (?, ?, ?, ?, 'numeric', 0.0, 500.0)",
        )
        .bind(name)
        .bind("Display")
        .bind("Synthetic measurements")
        .bind(unit)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn insert_point(pool: &SqlitePool, timestamp: &str, well: &str, metric: &str, value: f64) {
        sqlx::query(
            "INSERT INTO timeseries_data (timestamp, well_id, metric_name, value, quality_flag) \
             VALUES (?, ?, ?, ?, 'good')",
        )
        .bind(timestamp)
        .bind(well)
        .bind(metric)
        .bind(value)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn raw_window_is_sorted_and_inclusive() {
        let (_dir, pool) = test_pool().await;
        insert_well(&pool, "WELL-001").await;
        insert_metric(&pool, "oil_production_rate", "bbl/day").await;
        // Deliberately inserted out of order.
        insert_point(&pool, "2025-01-15T00:02:00Z", "WELL-001", "oil_production_rate", 3.0).await;
        insert_point(&pool, "2025-01-15T00:00:00Z", "WELL-001", "oil_production_rate", 1.0).await;
        insert_point(&pool, "2025-01-15T00:01:00Z", "WELL-001", "oil_production_rate", 2.0).await;

        let req = RawQuery::from_params(
            "WELL-001".into(),
            Some("oil_production_rate".into()),
            Some("2025-01-15T00:00:00Z".into()),
            Some("2025-01-15T00:02:00Z".into()),
        )
        .unwrap();
        let window = raw_window(&pool, &req).await.unwrap();

        let values: Vec<f64> = window.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert!(window.points.iter().all(|p| p.unit == "bbl/day"));
        assert_eq!(window.summary.total_points, 3);
        assert_eq!(window.summary.data_completeness, 100.0);
        assert_eq!(window.summary.start_timestamp, "2025-01-15T00:00:00Z");
    }

    #[tokio::test]
    async fn raw_window_reports_partial_completeness() {
        let (_dir, pool) = test_pool().await;
        insert_well(&pool, "WELL-001").await;
        insert_metric(&pool, "oil_production_rate", "bbl/day").await;
        // 10 of the 11 expected minutes.
        for minute in 0..10 {
            let stamp = format!("2025-01-15T00:{minute:02}:00Z");
            insert_point(&pool, &stamp, "WELL-001", "oil_production_rate", 1.0).await;
        }

        let req = RawQuery::from_params(
            "WELL-001".into(),
            Some("oil_production_rate".into()),
            Some("2025-01-15T00:00:00Z".into()),
            Some("2025-01-15T00:10:00Z".into()),
        )
        .unwrap();
        let window = raw_window(&pool, &req).await.unwrap();
        assert_eq!(window.summary.total_points, 10);
        assert_eq!(window.summary.data_completeness, 90.91);
    }

    #[tokio::test]
    async fn raw_window_rejects_unknown_identifiers() {
        let (_dir, pool) = test_pool().await;
        insert_well(&pool, "WELL-001").await;
        insert_metric(&pool, "oil_production_rate", "bbl/day").await;

        let req = RawQuery::from_params(
            "WELL-999".into(),
            Some("oil_production_rate".into()),
            Some("2025-01-15T00:00:00Z".into()),
            Some("2025-01-15T01:00:00Z".into()),
        )
        .unwrap();
        let err = raw_window(&pool, &req).await.unwrap_err();
        assert_eq!(err.to_string(), "Well not found: WELL-999");

        let req = RawQuery::from_params(
            "WELL-001".into(),
            Some("water_cut".into()),
            Some("2025-01-15T00:00:00Z".into()),
            Some("2025-01-15T01:00:00Z".into()),
        )
        .unwrap();
        let err = raw_window(&pool, &req).await.unwrap_err();
        assert_eq!(err.to_string(), "Metric not found: water_cut");
    }

    #[tokio::test]
    async fn registry_lookups_cover_missing_rows() {
        let (_dir, pool) = test_pool().await;
        insert_well(&pool, "WELL-001").await;
        insert_metric(&pool, "oil_production_rate", "bbl/day").await;
        insert_metric(&pool, "gas_production_rate", "mcf/day").await;
        insert_point(&pool, "2025-01-15T00:00:00Z", "WELL-001", "oil_production_rate", 1.0).await;

        assert_eq!(all_wells(&pool).await.unwrap().len(), 1);
        assert_eq!(all_metrics(&pool).await.unwrap().len(), 2);

        let well = well_by_id(&pool, "WELL-001").await.unwrap();
        assert_eq!(well.well_name, "North Field A 1");
        assert!(matches!(
            well_by_id(&pool, "WELL-404").await,
            Err(QueryError::WellNotFound(_))
        ));

        // Only the metric with recorded data shows up for the well.
        let metrics = metrics_for_well(&pool, "WELL-001").await.unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].metric_name, "oil_production_rate");
        assert!(matches!(
            metrics_for_well(&pool, "WELL-404").await,
            Err(QueryError::WellNotFound(_))
        ));
    }
}
