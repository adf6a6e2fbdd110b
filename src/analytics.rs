//! Revenue analytics facade
//!
//! Bundles the catalog store with the five query operations and the genre
//! batch. Each call is one request/response against the store.

use crate::aggregation;
use crate::average;
use crate::batch::{BatchOrchestrator, BatchReport};
use crate::config::AnalyticsConfig;
use crate::db::{CatalogRepository, Database, ErrorLogRepository};
use crate::error::Result;
use crate::ingestion::{self, ImportSummary};
use crate::model::{AggregatedRevenueRow, ErrorLogEntry, PivotedRow, RankedMovieRow};
use crate::pivot;
use crate::ranking;
use polars::prelude::DataFrame;
use std::io::Write;
use std::path::Path;

pub struct RevenueAnalytics {
    db: Database,
    revenue_threshold: f64,
}

impl RevenueAnalytics {
    pub fn new(db: Database, revenue_threshold: f64) -> Self {
        Self {
            db,
            revenue_threshold,
        }
    }

    pub fn open(config: &AnalyticsConfig) -> Result<Self> {
        let db = Database::open(&config.database_path)?;
        Ok(Self::new(db, config.revenue_threshold))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn catalog(&self) -> CatalogRepository<'_> {
        CatalogRepository::new(self.db.conn())
    }

    pub fn import_movies_csv(&mut self, path: impl AsRef<Path>) -> Result<ImportSummary> {
        ingestion::import_movies_csv(&mut self.db, path)
    }

    pub fn aggregate_revenue_by_genre(&self, country_id: Option<i64>) -> Result<Vec<AggregatedRevenueRow>> {
        aggregation::aggregate_revenue_by_genre(self.db.conn(), country_id)
    }

    pub fn fetch_genre_revenue_metrics(&self, country_id: Option<i64>) -> Result<DataFrame> {
        aggregation::fetch_genre_revenue_metrics(self.db.conn(), country_id)
    }

    pub fn analyze_genre_trends(&self, genre_id: i64) -> Result<Vec<RankedMovieRow>> {
        ranking::analyze_genre_trends(self.db.conn(), genre_id)
    }

    pub fn pivot_revenue_by_genre_and_country(
        &self,
        genre_id: Option<i64>,
        country_id: Option<i64>,
    ) -> Result<Vec<PivotedRow>> {
        pivot::pivot_revenue_by_genre_and_country(self.db.conn(), genre_id, country_id)
    }

    pub fn average_revenue(&self, genre_id: i64) -> Result<Option<f64>> {
        average::average_revenue(self.db.conn(), genre_id)
    }

    /// Run the genre batch against the store. Failures end up in the error
    /// log, never in the return value.
    pub fn run_genre_batch(&self, out: &mut dyn Write) -> BatchReport {
        let catalog = CatalogRepository::new(self.db.conn());
        let log = ErrorLogRepository::new(self.db.conn());
        BatchOrchestrator::new(&catalog, &log, self.revenue_threshold).run(out)
    }

    pub fn error_log(&self) -> Result<Vec<ErrorLogEntry>> {
        ErrorLogRepository::new(self.db.conn()).entries()
    }
}
