//! Catalog repository: movies, genres, countries and their join relations

use crate::error::{AnalyticsError, Result};
use crate::model::{Country, Genre, Movie};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

pub struct CatalogRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CatalogRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &'a Connection {
        self.conn
    }

    pub fn genre_exists(&self, genre_id: i64) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM genres WHERE id = ?1)",
            params![genre_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn country_exists(&self, country_id: i64) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM countries WHERE id = ?1)",
            params![country_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Fail with `InvalidArgument` unless the genre exists
    pub fn ensure_genre(&self, genre_id: i64) -> Result<()> {
        if !self.genre_exists(genre_id)? {
            return Err(AnalyticsError::InvalidArgument(format!(
                "genre id {} does not exist",
                genre_id
            )));
        }
        Ok(())
    }

    /// Fail with `InvalidArgument` unless the country exists
    pub fn ensure_country(&self, country_id: i64) -> Result<()> {
        if !self.country_exists(country_id)? {
            return Err(AnalyticsError::InvalidArgument(format!(
                "country id {} does not exist",
                country_id
            )));
        }
        Ok(())
    }

    pub fn genre(&self, genre_id: i64) -> Result<Option<Genre>> {
        let genre = self
            .conn
            .query_row(
                "SELECT id, name FROM genres WHERE id = ?1",
                params![genre_id],
                |row| {
                    Ok(Genre {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(genre)
    }

    pub fn genres(&self) -> Result<Vec<Genre>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM genres ORDER BY id")?;
        let genres = stmt
            .query_map([], |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(genres)
    }

    pub fn countries(&self) -> Result<Vec<Country>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM countries ORDER BY id")?;
        let countries = stmt
            .query_map([], |row| {
                Ok(Country {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(countries)
    }

    /// All movies tagged with a genre, in storage order
    pub fn movies_in_genre(&self, genre_id: i64) -> Result<Vec<Movie>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT m.id, m.title, m.revenue, m.release_date
            FROM movies m
            JOIN movie_genres mg ON mg.movie_id = m.id
            WHERE mg.genre_id = ?1
            ORDER BY m.id
            "#,
        )?;
        let movies = stmt
            .query_map(params![genre_id], |row| {
                Ok(Movie {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    revenue: row.get(2)?,
                    release_date: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(movies)
    }

    /// Genres with at least one movie whose revenue strictly exceeds `threshold`
    pub fn genres_with_movie_above(&self, threshold: f64) -> Result<Vec<Genre>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT g.id, g.name
            FROM genres g
            JOIN movie_genres mg ON mg.genre_id = g.id
            JOIN movies m ON m.id = mg.movie_id
            WHERE m.revenue > ?1
            ORDER BY g.id
            "#,
        )?;
        let genres = stmt
            .query_map(params![threshold], |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(genres)
    }

    pub fn insert_genre(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO genres (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_country(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO countries (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Look a genre up by name, creating it if missing. Returns `(id, created)`.
    pub fn get_or_create_genre(&self, name: &str) -> Result<(i64, bool)> {
        let existing = self
            .conn
            .query_row("SELECT id FROM genres WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        match existing {
            Some(id) => Ok((id, false)),
            None => Ok((self.insert_genre(name)?, true)),
        }
    }

    /// Look a country up by name, creating it if missing. Returns `(id, created)`.
    pub fn get_or_create_country(&self, name: &str) -> Result<(i64, bool)> {
        let existing = self
            .conn
            .query_row(
                "SELECT id FROM countries WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        match existing {
            Some(id) => Ok((id, false)),
            None => Ok((self.insert_country(name)?, true)),
        }
    }

    /// Insert a movie together with its genre and production-country links
    pub fn insert_movie(
        &self,
        title: &str,
        revenue: f64,
        release_date: NaiveDate,
        genre_ids: &[i64],
        country_ids: &[i64],
    ) -> Result<i64> {
        if !revenue.is_finite() || revenue < 0.0 {
            return Err(AnalyticsError::InvalidArgument(format!(
                "revenue for '{}' must be non-negative, got {}",
                title, revenue
            )));
        }

        self.conn.execute(
            "INSERT INTO movies (title, revenue, release_date) VALUES (?1, ?2, ?3)",
            params![title, revenue, release_date],
        )?;
        let movie_id = self.conn.last_insert_rowid();

        for genre_id in genre_ids {
            self.conn.execute(
                "INSERT INTO movie_genres (movie_id, genre_id) VALUES (?1, ?2)",
                params![movie_id, genre_id],
            )?;
        }
        for country_id in country_ids {
            self.conn.execute(
                "INSERT INTO movie_countries (movie_id, country_id) VALUES (?1, ?2)",
                params![movie_id, country_id],
            )?;
        }

        Ok(movie_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::fixtures::date;

    #[test]
    fn test_existence_checks() {
        let db = Database::open_in_memory().unwrap();
        let repo = CatalogRepository::new(db.conn());
        let action = repo.insert_genre("Action").unwrap();
        let usa = repo.insert_country("United States of America").unwrap();

        assert!(repo.genre_exists(action).unwrap());
        assert!(!repo.genre_exists(action + 100).unwrap());
        assert!(repo.country_exists(usa).unwrap());
        assert!(matches!(
            repo.ensure_country(usa + 7),
            Err(AnalyticsError::InvalidArgument(msg)) if msg.contains(&(usa + 7).to_string())
        ));
    }

    #[test]
    fn test_threshold_is_strict() {
        let db = Database::open_in_memory().unwrap();
        let repo = CatalogRepository::new(db.conn());
        let action = repo.insert_genre("Action").unwrap();
        let drama = repo.insert_genre("Drama").unwrap();
        repo.insert_movie("Exactly", 1_000_000.0, date("2001-01-01"), &[drama], &[])
            .unwrap();
        repo.insert_movie("Above", 1_000_000.5, date("2002-01-01"), &[action], &[])
            .unwrap();

        let genres = repo.genres_with_movie_above(1_000_000.0).unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].name, "Action");
    }

    #[test]
    fn test_get_or_create_reuses_existing_names() {
        let db = Database::open_in_memory().unwrap();
        let repo = CatalogRepository::new(db.conn());
        let (first, created) = repo.get_or_create_genre("Comedy").unwrap();
        assert!(created);
        let (second, created_again) = repo.get_or_create_genre("Comedy").unwrap();
        assert!(!created_again);
        assert_eq!(first, second);
    }

    #[test]
    fn test_movies_in_genre_reads_dates() {
        let db = Database::open_in_memory().unwrap();
        let repo = CatalogRepository::new(db.conn());
        let horror = repo.insert_genre("Horror").unwrap();
        repo.insert_movie("Night", 12.5, date("1999-10-31"), &[horror], &[])
            .unwrap();

        let movies = repo.movies_in_genre(horror).unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].release_date, date("1999-10-31"));
        assert_eq!(movies[0].revenue, 12.5);
    }
}
