//! Layered configuration
//!
//! Resolution order, later layers winning key by key:
//!
//! 1. Defaults embedded at build time (`config/default.toml`)
//! 2. An override file: `--config <path>` or `<config dir>/fintrack/config.toml`
//! 3. Environment variables (`ML_SERVICE_URL`, `ML_SERVICE_TIMEOUT_SECS`,
//!    `FINTRACK_STORE_TIMEOUT_SECS`, `JWT_SECRET`, `PORT`)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub predictor: PredictorConfig,
    pub store: StoreConfig,
    pub server: ServerSettings,
}

/// Where and how to reach the prediction service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl PredictorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub query_timeout_secs: u64,
}

impl StoreConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        // The embedded file is covered by tests; a parse failure here is a
        // build defect
        Self::from_toml_str("").unwrap_or_else(|_| Self {
            predictor: PredictorConfig {
                base_url: "http://localhost:8001".to_string(),
                timeout_secs: 10,
            },
            store: StoreConfig {
                query_timeout_secs: 5,
            },
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3000,
                jwt_secret: None,
                allowed_origins: Vec::new(),
            },
        })
    }
}

impl Config {
    /// Load defaults, the override file and the process environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = override_path
            .map(Path::to_path_buf)
            .or_else(default_config_path);

        let overrides = match path {
            Some(ref p) if p.exists() => {
                debug!(path = %p.display(), "Loading config file");
                fs::read_to_string(p)?
            }
            Some(ref p) if override_path.is_some() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            _ => String::new(),
        };

        let mut config = Self::from_toml_str(&overrides)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse `overrides` on top of the embedded defaults
    pub fn from_toml_str(overrides: &str) -> Result<Self> {
        let mut base: toml::Table = toml::from_str(DEFAULT_CONFIG)?;
        let layer: toml::Table = toml::from_str(overrides)?;
        merge_tables(&mut base, layer);
        Ok(toml::Value::Table(base).try_into()?)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ML_SERVICE_URL") {
            self.predictor.base_url = url;
        }
        if let Some(secs) = parse_env(&lookup, "ML_SERVICE_TIMEOUT_SECS") {
            self.predictor.timeout_secs = secs;
        }
        if let Some(secs) = parse_env(&lookup, "FINTRACK_STORE_TIMEOUT_SECS") {
            self.store.query_timeout_secs = secs;
        }
        if let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.server.jwt_secret = Some(secret);
        }
        if let Some(port) = parse_env(&lookup, "PORT") {
            self.server.port = port;
        }
    }
}

fn parse_env<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

/// Recursively overlay `layer` onto `base`
fn merge_tables(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Platform config file location (`~/.config/fintrack/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fintrack").join("config.toml"))
}
