use chrono::Utc;
use rusqlite::Connection;
use tracing::instrument;

use braid_core::ids::{GroupId, MessageId, TopicId};
use braid_core::message::{Message, Role, ToolCallBlock};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

const MESSAGE_COLUMNS: &str =
    "id, topic_id, parent_id, role, content, created_at, favorite, group_id, model, provider, tool_calls";

pub struct MessageRepo {
    db: Database,
}

impl MessageRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a fully-formed message verbatim (import, sync, fixtures).
    #[instrument(skip(self, message), fields(message_id = %message.id, topic_id = %message.topic_id))]
    pub fn insert(&self, message: &Message) -> Result<(), StoreError> {
        self.db.with_conn(|conn| insert_message(conn, message))
    }

    /// Append a new message to a topic, stamped now.
    #[instrument(skip(self, content), fields(topic_id = %topic_id, role = %role))]
    pub fn append(
        &self,
        topic_id: &TopicId,
        parent_id: Option<&MessageId>,
        role: Role,
        content: &str,
    ) -> Result<Message, StoreError> {
        let mut message = Message::new(topic_id, role, content);
        message.parent_id = parent_id.cloned();

        self.db.with_conn(|conn| {
            insert_message(conn, &message)?;
            conn.execute(
                "UPDATE topics SET updated_at = ?1 WHERE id = ?2",
                rusqlite::params![Utc::now().to_rfc3339(), topic_id.as_str()],
            )?;
            Ok(())
        })?;
        Ok(message)
    }

    /// Get a message by ID.
    #[instrument(skip(self), fields(message_id = %id))]
    pub fn get(&self, id: &MessageId) -> Result<Message, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
            ))?;
            let mut rows = stmt.query([id.as_str()])?;
            match rows.next()? {
                Some(row) => row_to_message(row),
                None => Err(StoreError::NotFound(format!("message {id}"))),
            }
        })
    }

    /// All messages for a topic, any grouping state, unfiltered.
    /// Ordered by created_at ascending with id as the deterministic tie-break.
    #[instrument(skip(self), fields(topic_id = %topic_id))]
    pub fn list_for_topic(&self, topic_id: &TopicId) -> Result<Vec<Message>, StoreError> {
        self.db.with_conn(|conn| list_for_topic_conn(conn, topic_id))
    }

    /// Toggle the pinned/important marker.
    #[instrument(skip(self), fields(message_id = %id, favorite))]
    pub fn set_favorite(&self, id: &MessageId, favorite: bool) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET favorite = ?1 WHERE id = ?2",
                rusqlite::params![favorite as i64, id.as_str()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("message {id}")));
            }
            Ok(())
        })
    }

    /// Assign a message to a group.
    #[instrument(skip(self), fields(message_id = %id, group_id = %group_id))]
    pub fn assign_group(&self, id: &MessageId, group_id: &GroupId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET group_id = ?1 WHERE id = ?2",
                rusqlite::params![group_id.as_str(), id.as_str()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("message {id}")));
            }
            Ok(())
        })
    }

    /// Remove a message from its group, if any.
    #[instrument(skip(self), fields(message_id = %id))]
    pub fn clear_group(&self, id: &MessageId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET group_id = NULL WHERE id = ?1",
                [id.as_str()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("message {id}")));
            }
            Ok(())
        })
    }

    /// Count messages in a topic.
    #[instrument(skip(self), fields(topic_id = %topic_id))]
    pub fn count(&self, topic_id: &TopicId) -> Result<i64, StoreError> {
        self.db.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE topic_id = ?1",
                [topic_id.as_str()],
                |row| row.get(0),
            )?)
        })
    }
}

pub(crate) fn insert_message(conn: &Connection, message: &Message) -> Result<(), StoreError> {
    let tool_calls = if message.tool_calls.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&message.tool_calls)?)
    };

    conn.execute(
        "INSERT INTO messages (id, topic_id, parent_id, role, content, created_at, favorite, group_id, model, provider, tool_calls)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            message.id.as_str(),
            message.topic_id.as_str(),
            message.parent_id.as_ref().map(|p| p.as_str()),
            message.role.to_string(),
            message.content,
            message.created_at.to_rfc3339(),
            message.favorite as i64,
            message.group_id.as_ref().map(|g| g.as_str()),
            message.model,
            message.provider,
            tool_calls,
        ],
    )?;
    Ok(())
}

pub(crate) fn list_for_topic_conn(
    conn: &Connection,
    topic_id: &TopicId,
) -> Result<Vec<Message>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE topic_id = ?1
         ORDER BY created_at ASC, id ASC"
    ))?;
    let mut rows = stmt.query([topic_id.as_str()])?;
    let mut results = Vec::new();
    while let Some(row) = rows.next()? {
        results.push(row_to_message(row)?);
    }
    Ok(results)
}

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<Message, StoreError> {
    let role_str: String = row_helpers::get(row, 3, "messages", "role")?;
    let created_at_str: String = row_helpers::get(row, 5, "messages", "created_at")?;
    let tool_calls: Vec<ToolCallBlock> = row_helpers::get_opt::<String>(row, 10, "messages", "tool_calls")?
        .map(|raw| row_helpers::parse_json(&raw, "messages", "tool_calls"))
        .transpose()?
        .unwrap_or_default();

    Ok(Message {
        id: MessageId::from_raw(row_helpers::get::<String>(row, 0, "messages", "id")?),
        topic_id: TopicId::from_raw(row_helpers::get::<String>(row, 1, "messages", "topic_id")?),
        parent_id: row_helpers::get_opt::<String>(row, 2, "messages", "parent_id")?
            .map(MessageId::from_raw),
        role: row_helpers::parse_enum(&role_str, "messages", "role")?,
        content: row_helpers::get(row, 4, "messages", "content")?,
        created_at: row_helpers::parse_timestamp(&created_at_str, "messages", "created_at")?,
        favorite: row_helpers::get::<i64>(row, 6, "messages", "favorite")? != 0,
        group_id: row_helpers::get_opt::<String>(row, 7, "messages", "group_id")?
            .map(GroupId::from_raw),
        model: row_helpers::get_opt(row, 8, "messages", "model")?,
        provider: row_helpers::get_opt(row, 9, "messages", "provider")?,
        tool_calls,
    })
}
