pub mod aggregation;
pub mod analytics;
pub mod average;
pub mod batch;
pub mod config;
pub mod db;
pub mod error;
pub mod ingestion;
pub mod model;
pub mod pivot;
pub mod ranking;

#[cfg(test)]
mod fixtures;

pub use analytics::RevenueAnalytics;
pub use error::{AnalyticsError, Result};
