//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Layered configuration for analytics and serve
//! - `build_services` - Analytics services over the opened database
//! - `cmd_init` - Initialize the database

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use fintrack_core::{Config, Database, Services, SharedStore, TimeRange};
use tracing::debug;

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::open(path_str)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    Config::load(config_path).context("Failed to load configuration")
}

/// Services backed by `db` and the HTTP predictor from `config`
pub fn build_services(db: &Database, config: &Config) -> Services {
    debug!(
        predictor = %config.predictor.base_url,
        timeout_secs = config.predictor.timeout_secs,
        "Using prediction service"
    );
    let store: SharedStore = Arc::new(db.clone());
    Services::from_config(store, config)
}

/// Parse a `--time-range` flag; absent means the default range
pub fn parse_time_range(raw: Option<&str>) -> Result<TimeRange> {
    match raw {
        None => Ok(TimeRange::default()),
        Some(token) => token.parse().map_err(anyhow::Error::msg),
    }
}

pub fn cmd_init(db_path: &Path, user: &str) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;

    let seeded = db
        .seed_default_categories(user)
        .context("Failed to seed default categories")?;
    println!("   Seeded {} default categories for {}", seeded, user);

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: fintrack import --file statement.csv");
    println!("  2. View analytics:      fintrack spending --time-range 3months");
    println!("  3. Start the API:       fintrack serve");

    Ok(())
}
