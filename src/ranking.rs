//! Genre trend analysis
//!
//! Two independent passes over one genre's movies:
//! 1. release date ascending: running revenue total, inclusive of the current
//!    movie (same-day releases fall back to movie id)
//! 2. revenue descending: competition rank, so equal revenue shares a rank and
//!    the next distinct revenue skips ahead
//!
//! The passes are joined back by row position and emitted in rank order.

use crate::db::CatalogRepository;
use crate::error::Result;
use crate::model::{Movie, RankedMovieRow};
use itertools::Itertools;
use rusqlite::Connection;
use std::cmp::Ordering;
use tracing::info;

/// Rank and accumulate the movies of `genre_id`. Unknown genres fail with
/// `InvalidArgument` before any movie is read.
pub fn analyze_genre_trends(conn: &Connection, genre_id: i64) -> Result<Vec<RankedMovieRow>> {
    let repo = CatalogRepository::new(conn);
    repo.ensure_genre(genre_id)?;

    let movies = repo.movies_in_genre(genre_id)?;
    if movies.is_empty() {
        info!("No movies found for genre id {}", genre_id);
        return Ok(Vec::new());
    }

    Ok(rank_and_accumulate(&movies))
}

/// Pure windowed computation over an already filtered movie set.
pub fn rank_and_accumulate(movies: &[Movie]) -> Vec<RankedMovieRow> {
    let cumulative = running_totals(movies);
    let ranks = competition_ranks(movies);

    (0..movies.len())
        .sorted_by(|&a, &b| {
            ranks[a]
                .cmp(&ranks[b])
                .then_with(|| chronological(&movies[a], &movies[b]))
        })
        .map(|idx| RankedMovieRow {
            title: movies[idx].title.clone(),
            revenue: movies[idx].revenue,
            cumulative_revenue: cumulative[idx],
            rank: ranks[idx],
        })
        .collect()
}

fn chronological(a: &Movie, b: &Movie) -> Ordering {
    a.release_date
        .cmp(&b.release_date)
        .then_with(|| a.id.cmp(&b.id))
}

/// Prefix sums in release order, indexed by input position
fn running_totals(movies: &[Movie]) -> Vec<f64> {
    let mut totals = vec![0.0; movies.len()];
    let mut running = 0.0;
    for idx in (0..movies.len()).sorted_by(|&a, &b| chronological(&movies[a], &movies[b])) {
        running += movies[idx].revenue;
        totals[idx] = running;
    }
    totals
}

/// Competition ranks over revenue descending, indexed by input position
fn competition_ranks(movies: &[Movie]) -> Vec<u32> {
    let mut ranks = vec![0u32; movies.len()];
    let order: Vec<usize> = (0..movies.len())
        .sorted_by(|&a, &b| movies[b].revenue.total_cmp(&movies[a].revenue))
        .collect();

    for (position, &idx) in order.iter().enumerate() {
        ranks[idx] = match position.checked_sub(1).map(|prev| order[prev]) {
            Some(prev) if movies[prev].revenue == movies[idx].revenue => ranks[prev],
            _ => position as u32 + 1,
        };
    }
    ranks
}
