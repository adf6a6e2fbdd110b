use crate::error::Result;
use rusqlite::{params, Connection};

/// Average revenue of the movies tagged with `genre_id`. `None` when the genre
/// has no movies.
pub fn average_revenue(conn: &Connection, genre_id: i64) -> Result<Option<f64>> {
    let average = conn.query_row(
        r#"
        SELECT AVG(m.revenue)
        FROM movies m
        JOIN movie_genres mg ON mg.movie_id = m.id
        WHERE mg.genre_id = ?1
        "#,
        params![genre_id],
        |row| row.get(0),
    )?;
    Ok(average)
}
