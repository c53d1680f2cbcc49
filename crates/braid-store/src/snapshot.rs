use serde::{Deserialize, Serialize};
use tracing::instrument;

use braid_core::group::MessageGroup;
use braid_core::ids::TopicId;
use braid_core::message::Message;

use crate::database::Database;
use crate::error::StoreError;
use crate::{groups, messages};

/// One topic's messages and groups as of a single read.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopicSnapshot {
    pub messages: Vec<Message>,
    pub groups: Vec<MessageGroup>,
}

/// Fetch a topic's messages and groups under one connection hold, so the
/// two reads observe the same logical state. Batching them here is the
/// accessor's obligation; the trajectory engine assumes it.
#[instrument(skip(db), fields(topic_id = %topic_id))]
pub fn fetch_topic_snapshot(
    db: &Database,
    topic_id: &TopicId,
) -> Result<TopicSnapshot, StoreError> {
    db.with_conn(|conn| {
        let messages = messages::list_for_topic_conn(conn, topic_id)?;
        let groups = groups::list_for_topic_conn(conn, topic_id)?;
        Ok(TopicSnapshot { messages, groups })
    })
}
