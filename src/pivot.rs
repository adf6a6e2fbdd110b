//! Genre x country revenue pivot
//!
//! Stage 1 pulls long-form rows from [`GenreCountryRevenueView`]. Stage 2
//! reshapes them to one row per genre with one column per entry of
//! [`PIVOT_COUNTRIES`]. Countries outside that list are dropped from the wide
//! output even though stage 1 aggregated them, and a missing genre/country
//! pair is a null cell, never zero.

use crate::aggregation::GenreCountryRevenueView;
use crate::error::Result;
use crate::model::{AggregatedRevenueRow, PivotedRow};
use polars::prelude::*;
use rusqlite::Connection;
use tracing::debug;

/// Pivot columns, in output order.
pub const PIVOT_COUNTRIES: [&str; 6] = [
    "United States of America",
    "United Kingdom",
    "France",
    "Germany",
    "India",
    "Japan",
];

/// Wide revenue table for the optional genre/country filters. Ids are not
/// validated; an unknown id simply matches nothing.
pub fn pivot_revenue_by_genre_and_country(
    conn: &Connection,
    genre_id: Option<i64>,
    country_id: Option<i64>,
) -> Result<Vec<PivotedRow>> {
    let long = GenreCountryRevenueView::rows(conn, genre_id, country_id)?;
    reshape(&long)
}

/// Long-to-wide reshape. Input rows are expected to be unique per
/// (genre, country); genres keep their first-appearance order.
pub fn reshape(rows: &[AggregatedRevenueRow]) -> Result<Vec<PivotedRow>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let wide = pivot_frame(rows)?;
    rows_from_frame(&wide)
}

/// Stage 2 as a polars frame: a `genre` column followed by one nullable
/// `f64` column per pivot country.
pub fn pivot_frame(rows: &[AggregatedRevenueRow]) -> Result<DataFrame> {
    let genres: Vec<&str> = rows.iter().map(|r| r.genre.as_str()).collect();
    let countries: Vec<Option<&str>> = rows.iter().map(|r| r.country.as_deref()).collect();
    let revenue: Vec<f64> = rows.iter().map(|r| r.total_revenue).collect();

    let long = df![
        "genre" => genres,
        "country" => countries,
        "total_revenue" => revenue,
    ]?;

    let cells: Vec<Expr> = PIVOT_COUNTRIES
        .iter()
        .map(|country| {
            col("total_revenue")
                .filter(col("country").eq(lit(*country)))
                .first()
                .alias(country)
        })
        .collect();

    let wide = long
        .lazy()
        .group_by_stable([col("genre")])
        .agg(cells)
        .collect()?;

    debug!(
        "Reshaped {} long rows into {} genre rows",
        rows.len(),
        wide.height()
    );
    Ok(wide)
}

fn rows_from_frame(wide: &DataFrame) -> Result<Vec<PivotedRow>> {
    let genres = wide.column("genre")?.str()?;
    let columns = PIVOT_COUNTRIES
        .iter()
        .map(|country| wide.column(country).and_then(|s| s.f64()))
        .collect::<PolarsResult<Vec<_>>>()?;

    let mut pivoted = Vec::with_capacity(wide.height());
    for idx in 0..wide.height() {
        let mut revenue = [None; PIVOT_COUNTRIES.len()];
        for (cell, column) in revenue.iter_mut().zip(&columns) {
            *cell = column.get(idx);
        }
        pivoted.push(PivotedRow {
            genre: genres.get(idx).unwrap_or_default().to_string(),
            revenue,
        });
    }
    Ok(pivoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::seeded_catalog;

    fn long(genre: &str, country: &str, revenue: f64) -> AggregatedRevenueRow {
        AggregatedRevenueRow {
            genre: genre.to_string(),
            country: Some(country.to_string()),
            total_revenue: revenue,
        }
    }

    #[test]
    fn test_missing_pairs_are_null_not_zero() {
        let rows = vec![
            long("Action", "France", 10.0),
            long("Action", "Japan", 0.0),
            long("Drama", "India", 4.0),
        ];
        let wide = reshape(&rows).unwrap();

        assert_eq!(wide.len(), 2);
        assert_eq!(wide[0].genre, "Action");
        assert_eq!(wide[0].revenue_for("France"), Some(10.0));
        assert_eq!(wide[0].revenue_for("Japan"), Some(0.0));
        assert_eq!(wide[0].revenue_for("India"), None);
        assert_eq!(wide[1].revenue, [None, None, None, None, Some(4.0), None]);
    }

    #[test]
    fn test_countries_outside_list_are_dropped() {
        let rows = vec![
            long("Comedy", "Brazil", 200.0),
            long("Drama", "Brazil", 50.0),
            long("Drama", "Germany", 75.0),
        ];
        let wide = reshape(&rows).unwrap();

        assert_eq!(wide.len(), 2);
        assert!(wide[0].revenue.iter().all(Option::is_none));
        assert_eq!(wide[1].revenue_for("Germany"), Some(75.0));
        assert_eq!(wide[1].revenue_for("Brazil"), None);
    }

    #[test]
    fn test_reshape_is_idempotent() {
        let rows = vec![
            long("Action", "United Kingdom", 1.5),
            long("Action", "United States of America", 2.0),
            long("Drama", "France", 0.3),
        ];
        assert_eq!(reshape(&rows).unwrap(), reshape(&rows).unwrap());
    }

    #[test]
    fn test_frame_has_fixed_columns() {
        let frame = pivot_frame(&[long("Action", "Brazil", 1.0)]).unwrap();
        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let mut expected = vec!["genre".to_string()];
        expected.extend(PIVOT_COUNTRIES.iter().map(|c| c.to_string()));
        assert_eq!(names, expected);
    }

    #[test]
    fn test_pivot_against_store() {
        let catalog = seeded_catalog();
        let wide = pivot_revenue_by_genre_and_country(catalog.db.conn(), None, None).unwrap();

        let genres: Vec<&str> = wide.iter().map(|r| r.genre.as_str()).collect();
        assert_eq!(genres, vec!["Action", "Comedy", "Drama"]);
        assert_eq!(wide[0].revenue_for("United States of America"), Some(2_000_000.0));
        assert_eq!(wide[0].revenue_for("United Kingdom"), Some(1_500_000.0));
        assert_eq!(wide[0].revenue_for("France"), None);
        assert!(wide[1].revenue.iter().all(Option::is_none));
        assert_eq!(wide[2].revenue_for("France"), Some(300_000.0));
    }

    #[test]
    fn test_pivot_filters() {
        let catalog = seeded_catalog();
        let conn = catalog.db.conn();

        let drama_only = pivot_revenue_by_genre_and_country(conn, Some(catalog.drama), None).unwrap();
        assert_eq!(drama_only.len(), 1);
        assert_eq!(drama_only[0].genre, "Drama");

        let uk_only = pivot_revenue_by_genre_and_country(conn, None, Some(catalog.uk)).unwrap();
        assert_eq!(uk_only.len(), 1);
        assert_eq!(uk_only[0].revenue_for("United Kingdom"), Some(1_500_000.0));
        assert_eq!(uk_only[0].revenue_for("United States of America"), None);

        let nothing = pivot_revenue_by_genre_and_country(conn, Some(9_999), None).unwrap();
        assert!(nothing.is_empty());
    }
}
