use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Unknown genre/country id. Surfaced to the immediate caller, never logged.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A per-genre batch step failed.
    #[error("Computation failure: {0}")]
    ComputationFailure(String),

    /// A fault outside the per-genre boundary of a batch run.
    #[error("Batch failure: {0}")]
    BatchFailure(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyticsError {
    /// Severity code recorded alongside the message in the error log.
    pub fn severity(&self) -> i32 {
        match self {
            AnalyticsError::BatchFailure(_) => 20,
            _ => 16,
        }
    }

    /// State code recorded alongside the message in the error log.
    pub fn state(&self) -> i32 {
        match self {
            AnalyticsError::InvalidArgument(_) => 1,
            AnalyticsError::ComputationFailure(_) => 2,
            AnalyticsError::BatchFailure(_) => 3,
            _ => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_codes_are_distinct() {
        let invalid = AnalyticsError::InvalidArgument("country id 9 does not exist".to_string());
        let computation = AnalyticsError::ComputationFailure("boom".to_string());
        let batch = AnalyticsError::BatchFailure("enumeration failed".to_string());

        assert_eq!((invalid.severity(), invalid.state()), (16, 1));
        assert_eq!((computation.severity(), computation.state()), (16, 2));
        assert_eq!((batch.severity(), batch.state()), (20, 3));
    }

    #[test]
    fn test_invalid_argument_message_names_input() {
        let err = AnalyticsError::InvalidArgument("genre id 42 does not exist".to_string());
        assert!(err.to_string().contains("42"));
    }
}
