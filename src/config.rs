//! Runtime configuration
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file by the binary). CLI flags override them.

use crate::error::{AnalyticsError, Result};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "ANALYTICS_DB_PATH";
pub const THRESHOLD_VAR: &str = "ANALYTICS_REVENUE_THRESHOLD";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

/// Revenue a movie must exceed for its genre to enter a batch run.
pub const DEFAULT_REVENUE_THRESHOLD: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// SQLite file holding the catalog and the error log
    pub database_path: PathBuf,

    /// Batch pre-filter threshold
    pub revenue_threshold: f64,

    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("revenue_analytics.db"),
            revenue_threshold: DEFAULT_REVENUE_THRESHOLD,
            log_filter: "info".to_string(),
        }
    }
}

impl AnalyticsConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_VAR) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(THRESHOLD_VAR) {
            config.revenue_threshold = parse_threshold(&raw)?;
        }

        if let Some(filter) = lookup(LOG_FILTER_VAR) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}

pub fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        AnalyticsError::Config(format!("{} must be a number, got '{}'", THRESHOLD_VAR, raw))
    })?;

    if !value.is_finite() || value < 0.0 {
        return Err(AnalyticsError::Config(format!(
            "{} must be a non-negative number, got '{}'",
            THRESHOLD_VAR, raw
        )));
    }

    Ok(value)
}
