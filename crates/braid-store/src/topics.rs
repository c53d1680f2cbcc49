use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use braid_core::ids::TopicId;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopicRow {
    pub id: TopicId,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct TopicRepo {
    db: Database,
}

impl TopicRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new topic.
    #[instrument(skip(self), fields(title))]
    pub fn create(&self, title: Option<&str>) -> Result<TopicRow, StoreError> {
        let id = TopicId::new();
        let now = Utc::now().to_rfc3339();

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO topics (id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id.as_str(), title, now, now],
            )?;
            Ok(TopicRow {
                id,
                title: title.map(str::to_string),
                created_at: now.clone(),
                updated_at: now,
            })
        })
    }

    /// Get a topic by ID.
    #[instrument(skip(self), fields(topic_id = %id))]
    pub fn get(&self, id: &TopicId) -> Result<TopicRow, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, created_at, updated_at FROM topics WHERE id = ?1",
            )?;
            let mut rows = stmt.query([id.as_str()])?;
            match rows.next()? {
                Some(row) => row_to_topic(row),
                None => Err(StoreError::NotFound(format!("topic {id}"))),
            }
        })
    }

    /// List topics, most recently updated first.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<TopicRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, created_at, updated_at FROM topics ORDER BY updated_at DESC",
            )?;
            let mut rows = stmt.query([])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_topic(row)?);
            }
            Ok(results)
        })
    }

    /// Update a topic's title.
    #[instrument(skip(self), fields(topic_id = %id))]
    pub fn rename(&self, id: &TopicId, title: &str) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let now = Utc::now().to_rfc3339();
            let changed = conn.execute(
                "UPDATE topics SET title = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![title, now, id.as_str()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("topic {id}")));
            }
            Ok(())
        })
    }

    /// Delete a topic with all its messages and groups.
    #[instrument(skip(self), fields(topic_id = %id))]
    pub fn delete(&self, id: &TopicId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM messages WHERE topic_id = ?1", [id.as_str()])?;
            conn.execute(
                "DELETE FROM message_groups WHERE topic_id = ?1",
                [id.as_str()],
            )?;
            conn.execute("DELETE FROM topics WHERE id = ?1", [id.as_str()])?;
            Ok(())
        })
    }
}

fn row_to_topic(row: &rusqlite::Row<'_>) -> Result<TopicRow, StoreError> {
    Ok(TopicRow {
        id: TopicId::from_raw(row_helpers::get::<String>(row, 0, "topics", "id")?),
        title: row_helpers::get_opt(row, 1, "topics", "title")?,
        created_at: row_helpers::get(row, 2, "topics", "created_at")?,
        updated_at: row_helpers::get(row, 3, "topics", "updated_at")?,
    })
}
