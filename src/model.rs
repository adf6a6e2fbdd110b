//! Catalog entities and the derived rows produced by the analytics operations.

use crate::pivot::PIVOT_COUNTRIES;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub revenue: f64,
    pub release_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
}

/// Summed revenue for one grouping key. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRevenueRow {
    pub genre: String,

    /// Set only by genre x country aggregations
    pub country: Option<String>,

    pub total_revenue: f64,
}

/// One movie of a genre with its running total and revenue rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMovieRow {
    pub title: String,
    pub revenue: f64,

    /// Prefix sum over release date ascending, inclusive of this movie
    pub cumulative_revenue: f64,

    /// Competition rank over revenue descending (ties share, gaps follow)
    pub rank: u32,
}

/// One genre with a revenue cell per entry of [`PIVOT_COUNTRIES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotedRow {
    pub genre: String,

    /// Positionally aligned with [`PIVOT_COUNTRIES`]; `None` when the genre has
    /// no revenue in that country.
    pub revenue: [Option<f64>; PIVOT_COUNTRIES.len()],
}

impl PivotedRow {
    pub fn revenue_for(&self, country: &str) -> Option<f64> {
        PIVOT_COUNTRIES
            .iter()
            .position(|c| *c == country)
            .and_then(|idx| self.revenue[idx])
    }
}

/// Persisted error log record. Identifier and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub id: i64,
    pub logged_at: NaiveDateTime,
    pub message: String,
    pub severity: i32,
    pub state: i32,
}

/// Fields supplied by the writer of an error log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewErrorLogEntry {
    pub message: String,
    pub severity: i32,
    pub state: i32,
}

impl NewErrorLogEntry {
    pub fn from_error(err: &crate::error::AnalyticsError) -> Self {
        Self {
            message: err.to_string(),
            severity: err.severity(),
            state: err.state(),
        }
    }
}
