use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

use crate::error::{ChatError, Result};

/// Shared SQLite handle behind both stores.
///
/// Row ids are computed as `MAX(id) + 1` under the connection lock, which
/// assumes this process is the only writer to the file.
pub struct Database {
    conn: Mutex<Connection>,
}

/// Stored timestamp format: UTC RFC 3339 with fixed microsecond precision,
/// so text order equals time order.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ChatError::Config(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chat_history (
                id INTEGER PRIMARY KEY,
                session_id TEXT NOT NULL,
                model TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL
             );

             CREATE INDEX IF NOT EXISTS idx_chat_history_session
                ON chat_history(session_id, timestamp);

             CREATE TABLE IF NOT EXISTS file_summaries (
                id INTEGER PRIMARY KEY,
                file_path TEXT NOT NULL,
                model TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                summary TEXT NOT NULL,
                UNIQUE(file_path, model)
             );",
        )?;
        Ok(())
    }

    /// Run `f` with exclusive access to the connection.
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn.lock();
        Ok(f(&mut conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically() {
        let early = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let late = early + chrono::Duration::microseconds(1);
        assert_eq!(timestamp(early), "2024-01-02T03:04:05.000000Z");
        assert!(timestamp(early) < timestamp(late));
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("chat.db");
        Database::open(&path).unwrap();
        assert!(path.exists());
    }
}
