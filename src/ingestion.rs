//! CSV catalog import
//!
//! Expected header: `title,revenue,release_date,genres,countries`.
//! `genres` and `countries` hold `|`-separated names and may be empty. Genres
//! and countries are created on first sight. A file is imported in a single
//! transaction: one bad row rejects the whole file.

use crate::db::{CatalogRepository, Database};
use crate::error::{AnalyticsError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct MovieRecord {
    title: String,
    revenue: f64,
    release_date: String,
    #[serde(default)]
    genres: String,
    #[serde(default)]
    countries: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub movies: usize,
    pub genres_created: usize,
    pub countries_created: usize,
}

pub fn import_movies_csv(db: &mut Database, path: impl AsRef<Path>) -> Result<ImportSummary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        AnalyticsError::Ingestion(format!("cannot open CSV file {}: {}", path.display(), e))
    })?;
    info!("Importing movies from {}", path.display());
    import_movies(db, file)
}

pub fn import_movies<R: Read>(db: &mut Database, reader: R) -> Result<ImportSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut summary = ImportSummary::default();

    let tx = db.conn_mut().transaction()?;
    {
        let repo = CatalogRepository::new(&tx);
        for (i, record) in rdr.deserialize::<MovieRecord>().enumerate() {
            let row = i + 1;
            let record = record
                .map_err(|e| AnalyticsError::Ingestion(format!("row {}: {}", row, e)))?;

            if !record.revenue.is_finite() || record.revenue < 0.0 {
                return Err(AnalyticsError::Ingestion(format!(
                    "row {}: revenue must be non-negative, got {}",
                    row, record.revenue
                )));
            }
            let release_date = NaiveDate::parse_from_str(&record.release_date, "%Y-%m-%d")
                .map_err(|e| {
                    AnalyticsError::Ingestion(format!(
                        "row {}: bad release_date '{}': {}",
                        row, record.release_date, e
                    ))
                })?;

            let mut genre_ids = Vec::new();
            for name in split_names(&record.genres) {
                let (id, created) = repo.get_or_create_genre(name)?;
                summary.genres_created += created as usize;
                genre_ids.push(id);
            }
            let mut country_ids = Vec::new();
            for name in split_names(&record.countries) {
                let (id, created) = repo.get_or_create_country(name)?;
                summary.countries_created += created as usize;
                country_ids.push(id);
            }

            repo.insert_movie(
                &record.title,
                record.revenue,
                release_date,
                &genre_ids,
                &country_ids,
            )?;
            summary.movies += 1;
        }
    }
    tx.commit()?;

    info!(
        "Imported {} movies ({} new genres, {} new countries)",
        summary.movies, summary.genres_created, summary.countries_created
    );
    Ok(summary)
}

fn split_names(field: &str) -> impl Iterator<Item = &str> {
    field.split('|').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVIES: &str = "\
title,revenue,release_date,genres,countries
Rocket,1500000,2010-05-01,Action,United States of America|United Kingdom
Quiet,300000,2012-01-01,Drama,France
Samba,200000,2015-06-01,Comedy|Drama,
";

    #[test]
    fn test_import_creates_catalog() {
        let mut db = Database::open_in_memory().unwrap();
        let summary = import_movies(&mut db, MOVIES.as_bytes()).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                movies: 3,
                genres_created: 3,
                countries_created: 3,
            }
        );
        let repo = CatalogRepository::new(db.conn());
        let drama = repo.get_or_create_genre("Drama").unwrap().0;
        assert_eq!(repo.movies_in_genre(drama).unwrap().len(), 2);
    }

    #[test]
    fn test_bad_row_rolls_back_whole_file() {
        let mut db = Database::open_in_memory().unwrap();
        let csv = "\
title,revenue,release_date,genres,countries
Good,10,2001-01-01,Action,
Bad,-5,2002-01-01,Action,
";
        let err = import_movies(&mut db, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AnalyticsError::Ingestion(msg) if msg.contains("row 2")));

        let repo = CatalogRepository::new(db.conn());
        assert!(repo.genres().unwrap().is_empty());
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let csv = "title,revenue,release_date,genres,countries\nOdd,1,01/02/2003,Drama,\n";
        let err = import_movies(&mut db, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AnalyticsError::Ingestion(msg) if msg.contains("01/02/2003")));
    }

    #[test]
    fn test_malformed_row_names_row() {
        let mut db = Database::open_in_memory().unwrap();
        let csv = "title,revenue,release_date,genres,countries\nOk,1,2001-01-01,Drama,\nBroken,lots,2002-01-01,Drama,\n";
        let err = import_movies(&mut db, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AnalyticsError::Ingestion(msg) if msg.starts_with("row 2")));
    }

    #[test]
    fn test_missing_file_is_ingestion_error_with_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nowhere.csv");
        let mut db = Database::open_in_memory().unwrap();

        let err = import_movies_csv(&mut db, &missing).unwrap_err();
        assert!(matches!(err, AnalyticsError::Ingestion(msg) if msg.contains("nowhere.csv")));
    }
}
