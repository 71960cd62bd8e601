use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

use super::db::{timestamp, Database};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub id: i64,
    pub file_path: String,
    pub model: String,
    pub summary: String,
    pub timestamp: String,
}

/// File summaries keyed by `(file_path, model)`; at most one row per key.
#[derive(Clone)]
pub struct ArtifactStore {
    db: Arc<Database>,
}

impl ArtifactStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert, or overwrite summary and timestamp of the existing row in place.
    pub fn upsert(&self, file_path: &str, model: &str, summary: &str) -> Result<()> {
        let stamp = timestamp(Utc::now());
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO file_summaries (id, file_path, model, timestamp, summary)
                 VALUES ((SELECT COALESCE(MAX(id), 0) + 1 FROM file_summaries), ?1, ?2, ?3, ?4)
                 ON CONFLICT(file_path, model) DO UPDATE SET
                    timestamp = excluded.timestamp,
                    summary = excluded.summary",
                params![file_path, model, stamp, summary],
            )?;
            Ok(())
        })
    }

    pub fn get(&self, file_path: &str, model: &str) -> Result<Option<String>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT summary FROM file_summaries WHERE file_path = ?1 AND model = ?2",
                params![file_path, model],
                |row| row.get(0),
            )
            .optional()
        })
    }

    /// Every stored summary for `file_path`, one per model.
    pub fn for_file(&self, file_path: &str) -> Result<Vec<FileSummary>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, file_path, model, timestamp, summary
                 FROM file_summaries
                 WHERE file_path = ?1
                 ORDER BY model ASC",
            )?;
            let rows = stmt
                .query_map(params![file_path], |row| {
                    Ok(FileSummary {
                        id: row.get(0)?,
                        file_path: row.get(1)?,
                        model: row.get(2)?,
                        timestamp: row.get(3)?,
                        summary: row.get(4)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
