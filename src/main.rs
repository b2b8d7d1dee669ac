//! WellServe - Synthetic Oil Well Time-Series API
//!
//! Read-only REST server over an embedded SQLite database of synthetic
//! oil well production data. On first start the database is seeded
//! deterministically from the configured RNG seed.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (./data/timeseries.db, port 8080, seed 42)
//! cargo run --release
//!
//! # Custom port and seed
//! cargo run --release -- --port 9000 --seed 7
//!
//! # Wipe the database and reseed on startup
//! cargo run --release -- --reset-db
//! ```
//!
//! # Environment Variables
//!
//! - `WELLSERVE_DB_PATH`: SQLite file path (default: ./data/timeseries.db)
//! - `WELLSERVE_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `WELLSERVE_SEED`: Generator seed (default: 42)
//! - `RUST_LOG`: Logging level (default: info)
//! - `RESET_DB`: Set to "true" to wipe the database file on startup

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use wellserve::api::{self, ApiContext};
use wellserve::config::AppConfig;
use wellserve::db;
use wellserve::generator::GeneratorConfig;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "wellserve")]
#[command(about = "Synthetic oil well time-series REST API")]
#[command(version)]
struct CliArgs {
    /// Path to the SQLite database file
    #[arg(long, env = "WELLSERVE_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Override the server address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Listen port shorthand, binds 0.0.0.0:<port> (ignored when --addr is set)
    #[arg(short, long)]
    port: Option<u16>,

    /// Seed for the deterministic data generator
    #[arg(long, env = "WELLSERVE_SEED")]
    seed: Option<u64>,

    /// Delete the database file on startup and reseed from scratch.
    /// Can also be set via RESET_DB=true environment variable.
    #[arg(long)]
    reset_db: bool,
}

// ============================================================================
// Database Reset
// ============================================================================

/// Check if database reset is requested via CLI flag or environment variable.
fn should_reset_db(cli_flag: bool) -> bool {
    if cli_flag {
        return true;
    }
    if let Ok(val) = std::env::var("RESET_DB") {
        let val_lower = val.to_lowercase();
        return val_lower == "true" || val_lower == "1" || val_lower == "yes";
    }
    false
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = AppConfig::from_env(args.db_path, args.addr, args.port, args.seed);

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  WellServe - Synthetic Oil Well Time-Series API");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("");
    info!("  Database: {}", config.db_path.display());
    info!("  Seed:     {}", config.seed);
    info!("");

    // Reset check runs BEFORE the pool opens the file
    if should_reset_db(args.reset_db) {
        warn!("RESET_DB detected, removing database before startup");
        db::reset_database_file(&config.db_path).context("Failed to reset database file")?;
    }

    let pool = db::create_pool(&config.db_path, config.max_db_connections)
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;

    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    if db::is_seeded(&pool).await? {
        info!("📊 Database already contains time-series data, skipping seed");
    } else {
        let gen_config = GeneratorConfig {
            seed: config.seed,
            ..GeneratorConfig::default()
        };
        let report = db::seed_database(&pool, &gen_config)
            .await
            .context("Failed to seed database")?;
        info!(
            "📊 Seeded {} wells, {} metrics, {} data points",
            report.wells, report.metrics, report.points
        );
    }

    let ctx = ApiContext::new(pool, config.clone());
    let app = api::build_router(ctx);

    info!("🌐 Starting HTTP server on {}...", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    info!("✓ HTTP server listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("");
    info!("✓ WellServe shutdown complete");
    Ok(())
}

/// Resolve when Ctrl+C arrives so axum can drain in-flight requests.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    info!("🛑 Received Ctrl+C, initiating shutdown...");
}
