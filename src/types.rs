//! Shared domain types for the well data service.
//!
//! Everything the HTTP layer serializes lives here: well and metric
//! registry rows, individual time-series observations, and the
//! aggregation vocabulary. Database row mapping is derived with
//! `sqlx::FromRow` so the query layer can select straight into these
//! structs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Registry rows
// ============================================================================

/// Classification of a well by its role in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum WellType {
    Producer,
    Injector,
    Observation,
}

/// A single well and its static metadata.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Well {
    pub well_id: String,
    pub well_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub operator: String,
    pub field_name: String,
    pub well_type: WellType,
    pub spud_date: NaiveDate,
    pub data_start_date: NaiveDate,
    pub data_end_date: NaiveDate,
}

/// Value domain of a metric. The synthetic catalog is numeric-only but
/// the column is kept open for boolean and categorical channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum DataType {
    Numeric,
    Boolean,
    Categorical,
}

/// A measurement channel: name, unit, and the typical operating range
/// used when generating plausible values.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Metric {
    pub metric_name: String,
    pub display_name: String,
    pub description: String,
    pub unit_of_measurement: String,
    pub data_type: DataType,
    pub typical_min: Option<f64>,
    pub typical_max: Option<f64>,
}

// ============================================================================
// Observations
// ============================================================================

/// Sensor confidence attached to every observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum QualityFlag {
    Good,
    Suspect,
    Bad,
}

impl QualityFlag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Suspect => "suspect",
            Self::Bad => "bad",
        }
    }
}

/// One minute-cadence observation as returned by the raw data endpoint.
/// The timestamp is passed through in its stored form
/// (`%Y-%m-%dT%H:%M:%SZ`), and the unit is denormalized from the metric
/// catalog so each point is self-describing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub timestamp: String,
    pub well_id: String,
    pub metric_name: String,
    pub value: f64,
    pub unit: String,
    pub quality_flag: QualityFlag,
}

// ============================================================================
// Aggregation vocabulary
// ============================================================================

/// Supported downsampling modes for the aggregated data endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationType {
    DailyAverage,
    DailyMax,
    DailyMin,
    DailySum,
    MonthlyAverage,
}

impl AggregationType {
    pub const ALL: [Self; 5] = [
        Self::DailyAverage,
        Self::DailyMax,
        Self::DailyMin,
        Self::DailySum,
        Self::MonthlyAverage,
    ];

    /// Parses the wire name (`daily_average`, `monthly_average`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "daily_average" => Some(Self::DailyAverage),
            "daily_max" => Some(Self::DailyMax),
            "daily_min" => Some(Self::DailyMin),
            "daily_sum" => Some(Self::DailySum),
            "monthly_average" => Some(Self::MonthlyAverage),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DailyAverage => "daily_average",
            Self::DailyMax => "daily_max",
            Self::DailyMin => "daily_min",
            Self::DailySum => "daily_sum",
            Self::MonthlyAverage => "monthly_average",
        }
    }
}

impl std::fmt::Display for AggregationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One downsampled period as returned by the aggregated data endpoint.
///
/// `date` is the first calendar day of the period; `time_period` is the
/// human label (`2025-03-14` for daily modes, `2025-03` for monthly).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPoint {
    pub date: String,
    pub time_period: String,
    pub well_id: String,
    pub metric_name: String,
    pub aggregated_value: f64,
    pub aggregation_type: AggregationType,
    pub unit: String,
    pub data_point_count: i64,
    pub min_value: f64,
    pub max_value: f64,
    pub data_completeness: f64,
}
