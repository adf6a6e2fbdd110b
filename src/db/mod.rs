//! Database module for the SQLite catalog store
//!
//! Read access to movies, genres, countries and their joins, plus the
//! append-only error log.

pub mod catalog_repo;
pub mod connection;
pub mod error_log;

pub use catalog_repo::CatalogRepository;
pub use connection::Database;
pub use error_log::{ErrorLogRepository, ErrorLogSink};
