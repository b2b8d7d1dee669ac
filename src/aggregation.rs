//! Downsampling of raw minute data into daily and monthly periods.
//!
//! Aggregation runs inside SQLite: rows are bucketed with `DATE()` and
//! `STRFTIME()` over the stored timestamp text and reduced with the SQL
//! aggregate matching the requested mode. Days or months with no rows
//! produce no period at all rather than a zero-filled placeholder.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::query::{self, completeness, round2, QueryError};
use crate::types::{AggregatedPoint, AggregationType};

/// Expected observations in one full day of minute data.
const POINTS_PER_DAY: i64 = 24 * 60;

impl AggregationType {
    /// The SQL aggregate applied to `value` within each period.
    pub const fn sql_fn(self) -> &'static str {
        match self {
            Self::DailyAverage | Self::MonthlyAverage => "AVG",
            Self::DailyMax => "MAX",
            Self::DailyMin => "MIN",
            Self::DailySum => "SUM",
        }
    }

    pub const fn is_monthly(self) -> bool {
        matches!(self, Self::MonthlyAverage)
    }
}

// ============================================================================
// Boundary parsing
// ============================================================================

/// A validated aggregation request: identifiers, a calendar date range
/// (inclusive, equality allowed), and the aggregation mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedQuery {
    pub well_id: String,
    pub metric_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub aggregation: AggregationType,
}

impl AggregatedQuery {
    /// Builds a validated query from raw request parameters. A
    /// single-day range (`start_date == end_date`) is legal.
    pub fn from_params(
        well_id: String,
        metric_name: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
        aggregation_type: Option<String>,
    ) -> Result<Self, QueryError> {
        let metric_name = required(metric_name, "metric_name")?;
        let start_date = query::parse_date(&required(start_date, "start_date")?)?;
        let end_date = query::parse_date(&required(end_date, "end_date")?)?;
        let raw_aggregation = required(aggregation_type, "aggregation_type")?;

        let aggregation = AggregationType::parse(&raw_aggregation).ok_or_else(|| {
            QueryError::InvalidParameter(format!(
                "unsupported aggregation_type '{raw_aggregation}': expected one of \
                 daily_average, daily_max, daily_min, daily_sum, monthly_average"
            ))
        })?;

        if start_date > end_date {
            return Err(QueryError::InvalidParameter(
                "start_date must be before or equal to end_date".to_string(),
            ));
        }

        Ok(Self { well_id, metric_name, start_date, end_date, aggregation })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, QueryError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(QueryError::InvalidParameter(format!("{name} is required"))),
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Periods plus the summary block for one aggregated response.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedWindow {
    pub periods: Vec<AggregatedPoint>,
    pub summary: AggregationSummary,
}

/// Echo of the query plus period count and mean completeness across the
/// returned periods (zero when no period matched).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AggregationSummary {
    pub well_id: String,
    pub metric_name: String,
    pub aggregation_type: AggregationType,
    pub start_date: String,
    pub end_date: String,
    pub total_periods: usize,
    pub average_data_completeness: f64,
}

/// period_date, time_period label, aggregate, count, min, max.
type PeriodRow = (String, String, f64, i64, f64, f64);

/// Runs one aggregation query. Identifier validation happens first, so
/// an unknown well or metric errors before any scan.
pub async fn aggregate_window(
    pool: &SqlitePool,
    req: &AggregatedQuery,
) -> Result<AggregatedWindow, QueryError> {
    query::ensure_well_exists(pool, &req.well_id).await?;
    let unit = query::metric_unit(pool, &req.metric_name).await?;

    let rows = fetch_period_rows(pool, req).await?;

    let periods: Vec<AggregatedPoint> = rows
        .into_iter()
        .map(|(date, time_period, aggregated_value, data_point_count, min_value, max_value)| {
            let expected = expected_points_for_period(req.aggregation, &date);
            AggregatedPoint {
                data_completeness: completeness(data_point_count.max(0) as usize, expected),
                date,
                time_period,
                well_id: req.well_id.clone(),
                metric_name: req.metric_name.clone(),
                aggregated_value,
                aggregation_type: req.aggregation,
                unit: unit.clone(),
                data_point_count,
                min_value,
                max_value,
            }
        })
        .collect();

    let average_data_completeness = if periods.is_empty() {
        0.0
    } else {
        round2(periods.iter().map(|p| p.data_completeness).sum::<f64>() / periods.len() as f64)
    };

    let summary = AggregationSummary {
        well_id: req.well_id.clone(),
        metric_name: req.metric_name.clone(),
        aggregation_type: req.aggregation,
        start_date: req.start_date.to_string(),
        end_date: req.end_date.to_string(),
        total_periods: periods.len(),
        average_data_completeness,
    };

    Ok(AggregatedWindow { periods, summary })
}

async fn fetch_period_rows(
    pool: &SqlitePool,
    req: &AggregatedQuery,
) -> Result<Vec<PeriodRow>, sqlx::Error> {
    // The aggregate name comes from the enum, never from user input.
    let sql = if req.aggregation.is_monthly() {
        "SELECT DATE(timestamp, 'start of month') AS period_date, \
                STRFTIME('%Y-%m', timestamp) AS time_period, \
                AVG(value), COUNT(*), MIN(value), MAX(value) \
         FROM timeseries_data \
         WHERE well_id = ? AND metric_name = ? \
           AND DATE(timestamp) >= DATE(?) AND DATE(timestamp) <= DATE(?) \
         GROUP BY STRFTIME('%Y-%m', timestamp) \
         ORDER BY period_date"
            .to_string()
    } else {
        format!(
            "SELECT DATE(timestamp) AS period_date, \
                    DATE(timestamp) AS time_period, \
                    {}(value), COUNT(*), MIN(value), MAX(value) \
             FROM timeseries_data \
             WHERE well_id = ? AND metric_name = ? \
               AND DATE(timestamp) >= DATE(?) AND DATE(timestamp) <= DATE(?) \
             GROUP BY DATE(timestamp) \
             ORDER BY DATE(timestamp)",
            req.aggregation.sql_fn()
        )
    };

    sqlx::query_as::<_, PeriodRow>(&sql)
        .bind(&req.well_id)
        .bind(&req.metric_name)
        .bind(req.start_date)
        .bind(req.end_date)
        .fetch_all(pool)
        .await
}

/// Expected observations in one period: 1440 per day, days-in-month
/// times 1440 for monthly buckets. A period date that fails to parse
/// scores zero, matching the completeness convention for an impossible
/// expectation.
fn expected_points_for_period(aggregation: AggregationType, period_date: &str) -> i64 {
    if !aggregation.is_monthly() {
        return POINTS_PER_DAY;
    }
    NaiveDate::parse_from_str(period_date, "%Y-%m-%d")
        .ok()
        .map_or(0, |d| days_in_month(&d) * POINTS_PER_DAY)
}

/// Calendar length of the month containing `date`.
pub(crate) fn days_in_month(date: &NaiveDate) -> i64 {
    use chrono::Datelike;
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(*date);
    let next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    next.map_or(30, |n| (n - first).num_days())
}
