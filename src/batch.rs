//! Failure-isolating batch over genres
//!
//! `Idle -> Enumerating -> Processing(genre)* -> Closed`
//!
//! The eligible genre list (at least one movie above the revenue threshold) is
//! materialized once, then each genre is processed in turn inside its own error
//! boundary. A failing genre produces one error log entry and the loop moves
//! on. A second boundary around enumeration and the loop catches everything
//! else, logs it once, and closes the batch. `run` never returns an error and
//! never lets a panic escape.

use crate::average;
use crate::db::{CatalogRepository, ErrorLogSink};
use crate::error::{AnalyticsError, Result};
use crate::model::{Genre, NewErrorLogEntry};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info};

/// Data the batch reads: the pre-filtered genre list and the per-genre average.
pub trait GenreBatchSource {
    /// Genres with at least one movie whose revenue exceeds `threshold`
    fn eligible_genres(&self, threshold: f64) -> Result<Vec<Genre>>;

    fn average_revenue(&self, genre: &Genre) -> Result<Option<f64>>;
}

impl GenreBatchSource for CatalogRepository<'_> {
    fn eligible_genres(&self, threshold: f64) -> Result<Vec<Genre>> {
        self.genres_with_movie_above(threshold)
    }

    fn average_revenue(&self, genre: &Genre) -> Result<Option<f64>> {
        average::average_revenue(self.conn(), genre.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Enumerating,
    Processing { genre_id: i64 },
    Closed,
}

/// Outcome counts of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub eligible: usize,
    pub succeeded: usize,
    pub failed: usize,

    /// Set when the outer boundary caught a failure
    pub aborted: bool,
}

pub struct BatchOrchestrator<'a> {
    source: &'a dyn GenreBatchSource,
    sink: &'a dyn ErrorLogSink,
    threshold: f64,
    state: BatchState,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(source: &'a dyn GenreBatchSource, sink: &'a dyn ErrorLogSink, threshold: f64) -> Self {
        Self {
            source,
            sink,
            threshold,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// Process every eligible genre, writing one summary line per success to `out`.
    pub fn run(&mut self, out: &mut dyn Write) -> BatchReport {
        let mut report = BatchReport::default();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.process_all(out, &mut report)));
        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err @ AnalyticsError::BatchFailure(_))) => Some(err),
            Ok(Err(err)) => Some(AnalyticsError::BatchFailure(err.to_string())),
            Err(payload) => Some(AnalyticsError::BatchFailure(format!(
                "batch panicked: {}",
                panic_message(payload.as_ref())
            ))),
        };

        if let Some(err) = failure {
            error!("Genre batch aborted: {}", err);
            report.aborted = true;
            self.record(&err);
        }

        self.transition(BatchState::Closed);
        info!(
            "Genre batch closed: {} eligible, {} succeeded, {} failed",
            report.eligible, report.succeeded, report.failed
        );
        report
    }

    fn process_all(&mut self, out: &mut dyn Write, report: &mut BatchReport) -> Result<()> {
        self.transition(BatchState::Enumerating);
        let genres = self.source.eligible_genres(self.threshold).map_err(|e| {
            AnalyticsError::BatchFailure(format!(
                "could not enumerate genres above {}: {}",
                self.threshold, e
            ))
        })?;
        report.eligible = genres.len();
        info!("{} genres have a movie above {}", genres.len(), self.threshold);

        for genre in &genres {
            self.transition(BatchState::Processing { genre_id: genre.id });
            match self.process_genre(genre, out) {
                Ok(()) => report.succeeded += 1,
                Err(err) => {
                    error!("Genre '{}' failed: {}", genre.name, err);
                    report.failed += 1;
                    self.record(&err);
                }
            }
        }
        Ok(())
    }

    fn process_genre(&self, genre: &Genre, out: &mut dyn Write) -> Result<()> {
        let source = self.source;
        let step = panic::catch_unwind(AssertUnwindSafe(|| -> Result<()> {
            let average = source.average_revenue(genre)?;
            write_summary(out, genre, average)
        }));

        match step {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(AnalyticsError::ComputationFailure(format!(
                "genre '{}' (id {}): {}",
                genre.name, genre.id, err
            ))),
            Err(payload) => Err(AnalyticsError::ComputationFailure(format!(
                "genre '{}' (id {}) panicked: {}",
                genre.name,
                genre.id,
                panic_message(payload.as_ref())
            ))),
        }
    }

    fn record(&self, err: &AnalyticsError) {
        if let Err(log_err) = self.sink.append(&NewErrorLogEntry::from_error(err)) {
            error!("Could not write error log entry for '{}': {}", err, log_err);
        }
    }

    fn transition(&mut self, next: BatchState) {
        debug!("Batch state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn write_summary(out: &mut dyn Write, genre: &Genre, average: Option<f64>) -> Result<()> {
    match average {
        Some(avg) => writeln!(out, "Genre: {}, Average Revenue: {:.2}", genre.name, avg)?,
        None => writeln!(out, "Genre: {}, Average Revenue: n/a", genre.name)?,
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
