//! Revenue aggregation
//!
//! The grouping logic lives in two reusable views. Every caller that needs
//! genre totals goes through them, and validation happens in the caller:
//!
//! - [`GenreRevenueView`]: revenue per genre, optional country filter, countries
//!   outer-joined so movies without production countries still count.
//! - [`GenreCountryRevenueView`]: revenue per (genre, country), both joins
//!   mandatory. Feeds the pivot reshaper.

use crate::db::CatalogRepository;
use crate::error::Result;
use crate::model::AggregatedRevenueRow;
use polars::prelude::*;
use rusqlite::{params, Connection};
use tracing::debug;

/// Parameterized genre revenue view. Trusts its caller to have validated
/// `country_id`.
///
/// A movie with several production countries contributes once per matching
/// country row, so the unfiltered total equals the per-country totals plus the
/// movies with no country at all.
pub struct GenreRevenueView;

impl GenreRevenueView {
    const SQL: &'static str = r#"
        SELECT g.name, SUM(m.revenue) AS total_revenue
        FROM genres g
        JOIN movie_genres mg ON mg.genre_id = g.id
        JOIN movies m ON m.id = mg.movie_id
        LEFT JOIN movie_countries mc ON mc.movie_id = m.id
        WHERE ?1 IS NULL OR mc.country_id = ?1
        GROUP BY g.id, g.name
        ORDER BY total_revenue DESC, g.id
    "#;

    pub fn rows(conn: &Connection, country_id: Option<i64>) -> Result<Vec<AggregatedRevenueRow>> {
        debug!(?country_id, "Querying genre revenue view");
        let mut stmt = conn.prepare(Self::SQL)?;
        let rows = stmt
            .query_map(params![country_id], |row| {
                Ok(AggregatedRevenueRow {
                    genre: row.get(0)?,
                    country: None,
                    total_revenue: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

/// Parameterized long-form (genre, country, revenue) view. Movies without a
/// genre or without a production country are dropped. Ordered by genre name,
/// then country name.
pub struct GenreCountryRevenueView;

impl GenreCountryRevenueView {
    const SQL: &'static str = r#"
        SELECT g.name, c.name, SUM(m.revenue) AS total_revenue
        FROM movies m
        JOIN movie_genres mg ON mg.movie_id = m.id
        JOIN genres g ON g.id = mg.genre_id
        JOIN movie_countries mc ON mc.movie_id = m.id
        JOIN countries c ON c.id = mc.country_id
        WHERE (?1 IS NULL OR g.id = ?1)
          AND (?2 IS NULL OR c.id = ?2)
        GROUP BY g.id, g.name, c.id, c.name
        ORDER BY g.name, c.name
    "#;

    pub fn rows(
        conn: &Connection,
        genre_id: Option<i64>,
        country_id: Option<i64>,
    ) -> Result<Vec<AggregatedRevenueRow>> {
        debug!(?genre_id, ?country_id, "Querying genre x country revenue view");
        let mut stmt = conn.prepare(Self::SQL)?;
        let rows = stmt
            .query_map(params![genre_id, country_id], |row| {
                Ok(AggregatedRevenueRow {
                    genre: row.get(0)?,
                    country: Some(row.get(1)?),
                    total_revenue: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn validate_country(conn: &Connection, country_id: Option<i64>) -> Result<()> {
    if let Some(id) = country_id {
        CatalogRepository::new(conn).ensure_country(id)?;
    }
    Ok(())
}

/// Total revenue per genre, highest first. With `country_id` set, only movies
/// produced in that country count; an unknown id fails with `InvalidArgument`.
pub fn aggregate_revenue_by_genre(
    conn: &Connection,
    country_id: Option<i64>,
) -> Result<Vec<AggregatedRevenueRow>> {
    validate_country(conn, country_id)?;
    GenreRevenueView::rows(conn, country_id)
}

/// Same totals as [`aggregate_revenue_by_genre`] as a `genre`/`total_revenue`
/// frame for reporting.
pub fn fetch_genre_revenue_metrics(conn: &Connection, country_id: Option<i64>) -> Result<DataFrame> {
    validate_country(conn, country_id)?;
    let rows = GenreRevenueView::rows(conn, country_id)?;

    let genres: Vec<&str> = rows.iter().map(|r| r.genre.as_str()).collect();
    let totals: Vec<f64> = rows.iter().map(|r| r.total_revenue).collect();
    let frame = df![
        "genre" => genres,
        "total_revenue" => totals,
    ]?;
    Ok(frame)
}
