//! Service configuration — environment variables, CLI args, defaults

use std::path::PathBuf;

/// WellServe configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file path
    pub db_path: PathBuf,
    /// Bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,
    /// Seed for the synthetic dataset generator (default: 42)
    pub seed: u64,
    /// Connection pool size (default: 5)
    pub max_db_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/timeseries.db"),
            bind_address: "0.0.0.0:8080".to_string(),
            seed: 42,
            max_db_connections: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with CLI overrides
    pub fn from_env(
        db_path: Option<PathBuf>,
        bind_address: Option<String>,
        port: Option<u16>,
        seed: Option<u64>,
    ) -> Self {
        let mut config = Self::default();

        // Database path: CLI arg > env var > default
        if let Some(path) = db_path.or_else(|| std::env::var("WELLSERVE_DB_PATH").ok().map(PathBuf::from)) {
            config.db_path = path;
        }

        // Bind address: CLI --bind-address or --port > env var
        if let Some(addr) = bind_address {
            config.bind_address = addr;
        } else if let Some(p) = port {
            config.bind_address = format!("0.0.0.0:{}", p);
        } else if let Ok(addr) = std::env::var("WELLSERVE_ADDR") {
            config.bind_address = addr;
        }

        // Generator seed: CLI arg > env var > default
        if let Some(s) = seed.or_else(|| {
            std::env::var("WELLSERVE_SEED")
                .ok()
                .and_then(|v| v.parse().ok())
        }) {
            config.seed = s;
        }

        // Optional overrides from env
        if let Ok(v) = std::env::var("WELLSERVE_MAX_CONNECTIONS") {
            if let Ok(n) = v.parse() {
                config.max_db_connections = n;
            }
        }

        config
    }
}
