//! WellServe: Synthetic Oil Well Time-Series API
//!
//! Read-only REST service over an embedded SQLite store of synthetic
//! oil well operational data.
//!
//! ## Architecture
//!
//! - **Generator**: Deterministic synthetic dataset (decline curves, seasonality, shutdowns)
//! - **Storage**: SQLite via sqlx with migrations and batched seeding
//! - **Query layer**: Typed, validated registry and raw-window queries
//! - **Aggregation**: Daily and monthly downsampling computed in SQL
//! - **API**: Axum handlers wrapping everything in a uniform envelope

pub mod aggregation;
pub mod api;
pub mod config;
pub mod db;
pub mod generator;
pub mod query;
pub mod types;

// Re-export configuration
pub use config::AppConfig;
pub use generator::GeneratorConfig;

// Re-export commonly used types
pub use types::{
    AggregatedPoint, AggregationType, DataType, Metric, QualityFlag, TimeSeriesPoint, Well,
    WellType,
};

// Re-export query surface
pub use aggregation::{AggregatedQuery, AggregatedWindow};
pub use query::{QueryError, RawQuery, RawWindow};
