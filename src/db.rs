//! Database connection pool, migration runner, and dataset seeding.
//!
//! Everything is SQLite behind a sqlx pool: WAL journaling for
//! concurrent readers, foreign keys on, and the schema applied from the
//! bundled `migrations/` directory. Seeding streams one generated
//! series at a time into batched multi-row inserts, so the full year of
//! minute data never sits in memory at once.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::generator::{self, GeneratorConfig, SeriesData};
use crate::query;
use crate::types::{Metric, Well};

/// Rows per multi-row INSERT. Five binds per row keeps a chunk well
/// under SQLite's bound-parameter limit.
const INSERT_CHUNK_ROWS: usize = 1000;

/// Open (creating if missing) the SQLite database and build the pool.
pub async fn create_pool(db_path: &Path, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .pragma("cache_size", "-64000")
        .pragma("temp_store", "MEMORY");

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!("Connected to SQLite at {}", db_path.display());
    Ok(pool)
}

/// Run database migrations from the migrations/ directory
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Migrations complete");
    Ok(())
}

/// Whether the time-series table already holds data. Seeding is skipped
/// when it does; delete the database file (or pass the reset flag) to
/// regenerate.
pub async fn is_seeded(pool: &SqlitePool) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM timeseries_data")
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Remove the database file along with its WAL and shared-memory
/// siblings.
pub fn reset_database_file(path: &Path) -> std::io::Result<()> {
    for suffix in ["", "-wal", "-shm"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        let candidate = PathBuf::from(name);
        if candidate.exists() {
            warn!("🔄 Removing {}", candidate.display());
            std::fs::remove_file(&candidate)?;
        }
    }
    Ok(())
}

// ============================================================================
// Seeding
// ============================================================================

/// Row counts reported after a successful seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub wells: usize,
    pub metrics: usize,
    pub points: u64,
}

/// Generate the synthetic dataset and load it. One series (well x
/// metric) is generated and inserted at a time, each inside its own
/// transaction of batched multi-row inserts.
pub async fn seed_database(
    pool: &SqlitePool,
    config: &GeneratorConfig,
) -> Result<SeedReport, sqlx::Error> {
    info!("🏭 Generating well registry ({} wells)...", config.num_wells);
    let wells = generator::generate_wells(config);
    insert_wells(pool, &wells).await?;

    info!("📊 Generating metric catalog...");
    let metrics = generator::metric_catalog();
    insert_metrics(pool, &metrics).await?;

    let grid = generator::timeline(config);
    let stamps: Vec<String> = grid.iter().map(query::format_timestamp).collect();
    let total_series = wells.len() * metrics.len();
    info!(
        "⏱️  Generating {} series x {} samples of minute data...",
        total_series,
        grid.len()
    );

    let mut points = 0u64;
    let mut done = 0usize;
    for (well_idx, well) in wells.iter().enumerate() {
        for (metric_idx, metric) in metrics.iter().enumerate() {
            let series = generator::generate_series(
                config,
                &grid,
                well,
                well_idx,
                metric_idx,
                &metric.metric_name,
            );
            points +=
                insert_series(pool, &stamps, &well.well_id, &metric.metric_name, &series).await?;
            done += 1;
            info!(
                "  ✓ [{done}/{total_series}] {} / {}",
                well.well_id, metric.metric_name
            );
        }
    }

    info!(
        "✅ Seeding complete: {} wells, {} metrics, {} data points",
        wells.len(),
        metrics.len(),
        points
    );
    Ok(SeedReport { wells: wells.len(), metrics: metrics.len(), points })
}

async fn insert_wells(pool: &SqlitePool, wells: &[Well]) -> Result<(), sqlx::Error> {
    for well in wells {
        sqlx::query(
            "INSERT OR REPLACE INTO wells (well_id, well_name, latitude, longitude, operator, \
             field_name, well_type, spud_date, data_start_date, data_end_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&well.well_id)
        .bind(&well.well_name)
        .bind(well.latitude)
        .bind(well.longitude)
        .bind(&well.operator)
        .bind(&well.field_name)
        .bind(well.well_type)
        .bind(well.spud_date)
        .bind(well.data_start_date)
        .bind(well.data_end_date)
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn insert_metrics(pool: &SqlitePool, metrics: &[Metric]) -> Result<(), sqlx::Error> {
    for metric in metrics {
        sqlx::query(
            "INSERT OR REPLACE INTO metrics (metric_name, display_name, description, \
             unit_of_measurement, data_type, typical_min, typical_max) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&metric.metric_name)
        .bind(&metric.display_name)
        .bind(&metric.description)
        .bind(&metric.unit_of_measurement)
        .bind(metric.data_type)
        .bind(metric.typical_min)
        .bind(metric.typical_max)
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn insert_series(
    pool: &SqlitePool,
    stamps: &[String],
    well_id: &str,
    metric_name: &str,
    series: &SeriesData,
) -> Result<u64, sqlx::Error> {
    debug_assert_eq!(stamps.len(), series.values.len());
    debug_assert_eq!(stamps.len(), series.flags.len());

    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for chunk_start in (0..stamps.len()).step_by(INSERT_CHUNK_ROWS) {
        let chunk_end = (chunk_start + INSERT_CHUNK_ROWS).min(stamps.len());
        let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> = sqlx::QueryBuilder::new(
            "INSERT INTO timeseries_data (timestamp, well_id, metric_name, value, quality_flag) ",
        );
        builder.push_values(chunk_start..chunk_end, |mut row, i| {
            row.push_bind(stamps[i].as_str())
                .push_bind(well_id)
                .push_bind(metric_name)
                .push_bind(series.values[i])
                .push_bind(series.flags[i]);
        });
        let result = builder.build().execute(&mut *tx).await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}
