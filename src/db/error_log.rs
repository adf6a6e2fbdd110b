//! Append-only error log

use crate::error::Result;
use crate::model::{ErrorLogEntry, NewErrorLogEntry};
use rusqlite::{params, Connection};

/// Destination for error records produced by batch runs.
pub trait ErrorLogSink {
    /// Append one entry and return its assigned id
    fn append(&self, entry: &NewErrorLogEntry) -> Result<i64>;
}

pub struct ErrorLogRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ErrorLogRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Result<Vec<ErrorLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, logged_at, message, severity, state FROM error_log ORDER BY id",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(ErrorLogEntry {
                    id: row.get(0)?,
                    logged_at: row.get(1)?,
                    message: row.get(2)?,
                    severity: row.get(3)?,
                    state: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM error_log", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl ErrorLogSink for ErrorLogRepository<'_> {
    fn append(&self, entry: &NewErrorLogEntry) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO error_log (message, severity, state) VALUES (?1, ?2, ?3)",
            params![entry.message, entry.severity, entry.state],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}
