use chrono::{DateTime, Utc};
use rusqlite::params;
use std::fmt;
use std::sync::Arc;

use super::db::{timestamp, Database};
use crate::error::Result;
use crate::llm::Role;

/// Opaque conversation scope, created once per process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: String,
    pub model: String,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

/// Append-only message log. There is no update or delete.
#[derive(Clone)]
pub struct ChatHistoryStore {
    db: Arc<Database>,
}

impl ChatHistoryStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn append(
        &self,
        session: &SessionId,
        model: &str,
        role: Role,
        content: &str,
    ) -> Result<ChatMessage> {
        self.append_at(session, model, role, content, Utc::now())
    }

    /// Append with an explicit timestamp.
    pub fn append_at(
        &self,
        session: &SessionId,
        model: &str,
        role: Role,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<ChatMessage> {
        let stamp = timestamp(at);
        let id = self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let next_id: i64 = tx.query_row(
                "SELECT COALESCE(MAX(id), 0) + 1 FROM chat_history",
                [],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO chat_history (id, session_id, model, timestamp, role, content)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![next_id, session.as_str(), model, stamp, role.as_str(), content],
            )?;
            tx.commit()?;
            Ok(next_id)
        })?;

        Ok(ChatMessage {
            id,
            session_id: session.as_str().to_string(),
            model: model.to_string(),
            role,
            content: content.to_string(),
            timestamp: stamp,
        })
    }

    /// Full rows for a session, oldest first.
    pub fn messages(&self, session: &SessionId) -> Result<Vec<ChatMessage>> {
        let rows = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, model, timestamp, role, content
                 FROM chat_history
                 WHERE session_id = ?1
                 ORDER BY timestamp ASC, id ASC",
            )?;
            let rows = stmt
                .query_map(params![session.as_str()], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, session_id, model, timestamp, role, content)| {
                let Some(role) = Role::from_str_opt(&role) else {
                    tracing::warn!("Skipping chat_history row {id} with unknown role '{role}'");
                    return None;
                };
                Some(ChatMessage {
                    id,
                    session_id,
                    model,
                    role,
                    content,
                    timestamp,
                })
            })
            .collect())
    }

    /// `(role, content)` pairs for a session, ascending by timestamp.
    pub fn get(&self, session: &SessionId) -> Result<Vec<(Role, String)>> {
        Ok(self
            .messages(session)?
            .into_iter()
            .map(|m| (m.role, m.content))
            .collect())
    }
}
