//! Data Pipeline Tests
//!
//! End-to-end checks of the generate -> store -> query path against real
//! temporary SQLite databases: seeding is reproducible bit for bit,
//! registry rows survive the round trip, and SQL aggregation agrees with
//! the raw windows it summarizes.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;

use wellserve::aggregation::{aggregate_window, AggregatedQuery};
use wellserve::db;
use wellserve::generator::{self, GeneratorConfig};
use wellserve::query::{self, RawQuery};
use wellserve::types::{AggregationType, WellType};

/// One seeded calendar day: 1441 samples per series across 3 wells and
/// 5 metrics.
fn one_day_config(seed: u64) -> GeneratorConfig {
    GeneratorConfig {
        num_wells: 3,
        seed,
        start_date: NaiveDate::from_ymd_opt(2024, 12, 9).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
    }
}

async fn seeded_pool(dir: &TempDir, file: &str, config: &GeneratorConfig) -> SqlitePool {
    let pool = db::create_pool(&dir.path().join(file), 2).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    db::seed_database(&pool, config).await.unwrap();
    pool
}

fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap()
}

fn daily(well_id: &str, metric: &str, aggregation: AggregationType) -> AggregatedQuery {
    AggregatedQuery {
        well_id: well_id.into(),
        metric_name: metric.into(),
        start_date: NaiveDate::from_ymd_opt(2024, 12, 9).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 9).unwrap(),
        aggregation,
    }
}

/// The seed report matches what actually landed in the tables.
#[tokio::test]
async fn seed_report_matches_stored_rows() {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::create_pool(&dir.path().join("report.db"), 2).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    let report = db::seed_database(&pool, &one_day_config(42)).await.unwrap();

    assert_eq!(report.wells, 3);
    assert_eq!(report.metrics, 5);
    // 3 wells x 5 metrics x 1441 minute samples
    assert_eq!(report.points, 3 * 5 * 1441);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM timeseries_data")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows as u64, report.points);
}

/// Two databases seeded from the same seed hold identical data.
#[tokio::test]
async fn reseeding_with_same_seed_is_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = one_day_config(42);
    let pool_a = seeded_pool(&dir, "same_a.db", &config).await;
    let pool_b = seeded_pool(&dir, "same_b.db", &config).await;

    let totals_a: (i64, f64) = sqlx::query_as("SELECT COUNT(*), SUM(value) FROM timeseries_data")
        .fetch_one(&pool_a)
        .await
        .unwrap();
    let totals_b: (i64, f64) = sqlx::query_as("SELECT COUNT(*), SUM(value) FROM timeseries_data")
        .fetch_one(&pool_b)
        .await
        .unwrap();
    assert_eq!(totals_a.0, totals_b.0);
    assert_eq!(totals_a.1.to_bits(), totals_b.1.to_bits());

    let sample_sql = "SELECT timestamp, value FROM timeseries_data \
                      ORDER BY well_id, metric_name, timestamp LIMIT 200";
    let sample_a: Vec<(String, f64)> = sqlx::query_as(sample_sql).fetch_all(&pool_a).await.unwrap();
    let sample_b: Vec<(String, f64)> = sqlx::query_as(sample_sql).fetch_all(&pool_b).await.unwrap();
    assert_eq!(sample_a, sample_b);
}

/// A different seed produces a different dataset.
#[tokio::test]
async fn different_seeds_diverge() {
    let dir = tempfile::tempdir().unwrap();
    let pool_a = seeded_pool(&dir, "seed_42.db", &one_day_config(42)).await;
    let pool_b = seeded_pool(&dir, "seed_1337.db", &one_day_config(1337)).await;

    let sum_sql = "SELECT SUM(value) FROM timeseries_data \
                   WHERE well_id = 'WELL-001' AND metric_name = 'oil_production_rate'";
    let sum_a: f64 = sqlx::query_scalar(sum_sql).fetch_one(&pool_a).await.unwrap();
    let sum_b: f64 = sqlx::query_scalar(sum_sql).fetch_one(&pool_b).await.unwrap();
    assert!(
        (sum_a - sum_b).abs() > 1.0,
        "seeds 42 and 1337 produced the same daily oil total {sum_a}"
    );
}

/// Registry rows read back exactly as the generator produced them.
#[tokio::test]
async fn wells_registry_round_trips_through_storage() {
    let dir = tempfile::tempdir().unwrap();
    let config = one_day_config(42);
    let pool = seeded_pool(&dir, "registry.db", &config).await;

    let generated = generator::generate_wells(&config);
    let stored = query::all_wells(&pool).await.unwrap();
    assert_eq!(generated, stored);
}

/// Every well has data behind all five catalog metrics.
#[tokio::test]
async fn every_well_reports_full_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let pool = seeded_pool(&dir, "catalog.db", &one_day_config(42)).await;

    let wells = query::all_wells(&pool).await.unwrap();
    assert_eq!(wells.len(), 3);
    for well in &wells {
        let metrics = query::metrics_for_well(&pool, &well.well_id).await.unwrap();
        assert_eq!(metrics.len(), 5, "incomplete catalog for {}", well.well_id);
    }
}

/// AVG times COUNT reproduces SUM within floating point noise.
#[tokio::test]
async fn daily_sum_consistent_with_average() {
    let dir = tempfile::tempdir().unwrap();
    let pool = seeded_pool(&dir, "algebra.db", &one_day_config(42)).await;

    let avg = aggregate_window(&pool, &daily("WELL-001", "oil_production_rate", AggregationType::DailyAverage))
        .await
        .unwrap();
    let sum = aggregate_window(&pool, &daily("WELL-001", "oil_production_rate", AggregationType::DailySum))
        .await
        .unwrap();

    assert_eq!(avg.periods.len(), 1);
    assert_eq!(sum.periods.len(), 1);
    let avg_value = avg.periods[0].aggregated_value;
    let count = avg.periods[0].data_point_count as f64;
    let sum_value = sum.periods[0].aggregated_value;
    assert!(
        (avg_value * count - sum_value).abs() < 1e-6,
        "AVG {avg_value} x COUNT {count} != SUM {sum_value}"
    );
}

/// Daily MIN/MAX equal the extrema of the raw points in the same day.
#[tokio::test]
async fn daily_extrema_match_raw_window() {
    let dir = tempfile::tempdir().unwrap();
    let pool = seeded_pool(&dir, "extrema.db", &one_day_config(42)).await;

    // 00:00 .. 23:59 covers exactly the rows the daily bucket groups.
    let raw = query::raw_window(
        &pool,
        &RawQuery {
            well_id: "WELL-001".into(),
            metric_name: "oil_production_rate".into(),
            start: ts("2024-12-09T00:00:00Z"),
            end: ts("2024-12-09T23:59:00Z"),
        },
    )
    .await
    .unwrap();
    assert_eq!(raw.summary.total_points, 1440);

    let raw_max = raw.points.iter().map(|p| p.value).fold(f64::MIN, f64::max);
    let raw_min = raw.points.iter().map(|p| p.value).fold(f64::MAX, f64::min);

    let max = aggregate_window(&pool, &daily("WELL-001", "oil_production_rate", AggregationType::DailyMax))
        .await
        .unwrap();
    let min = aggregate_window(&pool, &daily("WELL-001", "oil_production_rate", AggregationType::DailyMin))
        .await
        .unwrap();

    assert_eq!(max.periods[0].aggregated_value, raw_max);
    assert_eq!(min.periods[0].aggregated_value, raw_min);
}

/// Gas injection is flat zero except on injector wells.
#[tokio::test]
async fn injection_follows_well_type() {
    let dir = tempfile::tempdir().unwrap();
    let pool = seeded_pool(&dir, "injection.db", &one_day_config(42)).await;

    for well in query::all_wells(&pool).await.unwrap() {
        let window =
            aggregate_window(&pool, &daily(&well.well_id, "gas_injection_rate", AggregationType::DailySum))
                .await
                .unwrap();
        assert_eq!(window.periods.len(), 1);
        let total = window.periods[0].aggregated_value;
        if well.well_type == WellType::Injector {
            assert!(total > 0.0, "{} injects nothing", well.well_id);
        } else {
            assert_eq!(total, 0.0, "{} is not an injector but shows {total}", well.well_id);
        }
    }
}

/// The full seeded range reads back as a complete, ordered window.
#[tokio::test]
async fn full_range_raw_window_is_complete() {
    let dir = tempfile::tempdir().unwrap();
    let pool = seeded_pool(&dir, "full_range.db", &one_day_config(42)).await;

    let window = query::raw_window(
        &pool,
        &RawQuery {
            well_id: "WELL-002".into(),
            metric_name: "wellhead_pressure".into(),
            start: ts("2024-12-09T00:00:00Z"),
            end: ts("2024-12-10T00:00:00Z"),
        },
    )
    .await
    .unwrap();

    assert_eq!(window.summary.total_points, 1441);
    assert_eq!(window.summary.data_completeness, 100.0);
    for pair in window.points.windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
    assert!(window.points.iter().all(|p| p.unit == "psi"));
}
