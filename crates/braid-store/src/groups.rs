use rusqlite::Connection;
use tracing::instrument;

use braid_core::group::MessageGroup;
use braid_core::ids::{GroupId, MessageId, TopicId};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

const GROUP_COLUMNS: &str = "id, topic_id, kind, created_at, content, parent_message_id";

pub struct GroupRepo {
    db: Database,
}

impl GroupRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a fully-formed group verbatim (import, fixtures).
    #[instrument(skip(self, group), fields(group_id = %group.id, kind = %group.kind))]
    pub fn insert(&self, group: &MessageGroup) -> Result<(), StoreError> {
        self.db.with_conn(|conn| insert_group(conn, group))
    }

    /// Get a group by ID.
    #[instrument(skip(self), fields(group_id = %id))]
    pub fn get(&self, id: &GroupId) -> Result<MessageGroup, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {GROUP_COLUMNS} FROM message_groups WHERE id = ?1"
            ))?;
            let mut rows = stmt.query([id.as_str()])?;
            match rows.next()? {
                Some(row) => row_to_group(row),
                None => Err(StoreError::NotFound(format!("group {id}"))),
            }
        })
    }

    /// All groups for a topic.
    #[instrument(skip(self), fields(topic_id = %topic_id))]
    pub fn list_for_topic(&self, topic_id: &TopicId) -> Result<Vec<MessageGroup>, StoreError> {
        self.db.with_conn(|conn| list_for_topic_conn(conn, topic_id))
    }

    /// Replace a range of messages with a compression group. Creates the
    /// group row and stamps every member's group_id in one connection hold.
    #[instrument(skip(self, content), fields(topic_id = %topic_id, members = member_ids.len()))]
    pub fn compress(
        &self,
        topic_id: &TopicId,
        content: &str,
        member_ids: &[MessageId],
    ) -> Result<MessageGroup, StoreError> {
        let group = MessageGroup::compression(topic_id, content);
        self.db.with_conn(|conn| {
            insert_group(conn, &group)?;
            assign_members(conn, topic_id, &group.id, member_ids)?;
            Ok(())
        })?;
        Ok(group)
    }

    /// Fold sibling alternate responses into a parallel group.
    #[instrument(skip(self), fields(topic_id = %topic_id, parent = %parent_message_id, members = member_ids.len()))]
    pub fn parallelize(
        &self,
        topic_id: &TopicId,
        parent_message_id: &MessageId,
        member_ids: &[MessageId],
    ) -> Result<MessageGroup, StoreError> {
        let group = MessageGroup::parallel(topic_id, parent_message_id);
        self.db.with_conn(|conn| {
            insert_group(conn, &group)?;
            assign_members(conn, topic_id, &group.id, member_ids)?;
            Ok(())
        })?;
        Ok(group)
    }

    /// Delete a group and release its members back to top level.
    #[instrument(skip(self), fields(group_id = %id))]
    pub fn dissolve(&self, id: &GroupId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE messages SET group_id = NULL WHERE group_id = ?1",
                [id.as_str()],
            )?;
            let deleted = conn.execute(
                "DELETE FROM message_groups WHERE id = ?1",
                [id.as_str()],
            )?;
            if deleted == 0 {
                return Err(StoreError::NotFound(format!("group {id}")));
            }
            Ok(())
        })
    }
}

fn insert_group(conn: &Connection, group: &MessageGroup) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO message_groups (id, topic_id, kind, created_at, content, parent_message_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            group.id.as_str(),
            group.topic_id.as_str(),
            group.kind.to_string(),
            group.created_at.to_rfc3339(),
            group.content,
            group.parent_message_id.as_ref().map(|p| p.as_str()),
        ],
    )?;
    Ok(())
}

fn assign_members(
    conn: &Connection,
    topic_id: &TopicId,
    group_id: &GroupId,
    member_ids: &[MessageId],
) -> Result<(), StoreError> {
    for member_id in member_ids {
        let changed = conn.execute(
            "UPDATE messages SET group_id = ?1 WHERE id = ?2 AND topic_id = ?3",
            rusqlite::params![group_id.as_str(), member_id.as_str(), topic_id.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!(
                "message {member_id} in topic {topic_id}"
            )));
        }
    }
    Ok(())
}

pub(crate) fn list_for_topic_conn(
    conn: &Connection,
    topic_id: &TopicId,
) -> Result<Vec<MessageGroup>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GROUP_COLUMNS} FROM message_groups WHERE topic_id = ?1
         ORDER BY created_at ASC, id ASC"
    ))?;
    let mut rows = stmt.query([topic_id.as_str()])?;
    let mut results = Vec::new();
    while let Some(row) = rows.next()? {
        results.push(row_to_group(row)?);
    }
    Ok(results)
}

fn row_to_group(row: &rusqlite::Row<'_>) -> Result<MessageGroup, StoreError> {
    let kind_str: String = row_helpers::get(row, 2, "message_groups", "kind")?;
    let created_at_str: String = row_helpers::get(row, 3, "message_groups", "created_at")?;

    Ok(MessageGroup {
        id: GroupId::from_raw(row_helpers::get::<String>(row, 0, "message_groups", "id")?),
        topic_id: TopicId::from_raw(row_helpers::get::<String>(row, 1, "message_groups", "topic_id")?),
        kind: row_helpers::parse_enum(&kind_str, "message_groups", "kind")?,
        created_at: row_helpers::parse_timestamp(&created_at_str, "message_groups", "created_at")?,
        content: row_helpers::get_opt(row, 4, "message_groups", "content")?,
        parent_message_id: row_helpers::get_opt::<String>(row, 5, "message_groups", "parent_message_id")?
            .map(MessageId::from_raw),
    })
}
