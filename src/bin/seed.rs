//! Standalone database seeder.
//!
//! Creates (or refreshes) the SQLite database without starting the HTTP
//! server. Useful for pre-baking a database file into a container image
//! or for generating datasets with non-default date ranges.
//!
//! # Usage
//!
//! ```bash
//! # Seed with defaults (3 wells, one year of minute data, seed 42)
//! cargo run --bin seed
//!
//! # Five wells, custom window, fresh file
//! cargo run --bin seed -- --wells 5 \
//!     --start-date 2025-01-01 --end-date 2025-03-01 --reset
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, warn};

use wellserve::config::AppConfig;
use wellserve::db;
use wellserve::generator::GeneratorConfig;

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Seed the WellServe SQLite database with synthetic data")]
#[command(version)]
struct Args {
    /// Path to the SQLite database file
    #[arg(long, env = "WELLSERVE_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Seed for the deterministic data generator
    #[arg(long, env = "WELLSERVE_SEED")]
    seed: Option<u64>,

    /// Number of wells to generate
    #[arg(long)]
    wells: Option<usize>,

    /// First day of the generated window (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Last day of the generated window (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Delete any existing database file before seeding
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env(args.db_path, None, None, args.seed);

    let defaults = GeneratorConfig::default();
    let gen_config = GeneratorConfig {
        num_wells: args.wells.unwrap_or(defaults.num_wells),
        seed: config.seed,
        start_date: args.start_date.unwrap_or(defaults.start_date),
        end_date: args.end_date.unwrap_or(defaults.end_date),
    };

    if gen_config.start_date > gen_config.end_date {
        anyhow::bail!(
            "--start-date {} is after --end-date {}",
            gen_config.start_date,
            gen_config.end_date
        );
    }

    if args.reset {
        warn!("--reset requested, removing existing database");
        db::reset_database_file(&config.db_path).context("Failed to reset database file")?;
    }

    let pool = db::create_pool(&config.db_path, config.max_db_connections)
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;

    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    if db::is_seeded(&pool).await? {
        info!("Database already contains time-series data, nothing to do");
        info!("Re-run with --reset to regenerate from scratch");
        return Ok(());
    }

    let report = db::seed_database(&pool, &gen_config)
        .await
        .context("Failed to seed database")?;

    info!("");
    info!(
        "Done: {} wells, {} metrics, {} data points at {}",
        report.wells,
        report.metrics,
        report.points,
        config.db_path.display()
    );
    Ok(())
}
