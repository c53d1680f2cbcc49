use tracing::instrument;

use braid_core::group::MessageGroup;
use braid_core::ids::TopicId;
use braid_core::message::Message;
use braid_core::trajectory::Trajectory;
use braid_store::{fetch_topic_snapshot, Database, TopicSnapshot};

use crate::assemble::assemble;
use crate::error::EngineError;
use crate::index::GroupIndex;
use crate::synthesize::synthesize;

/// Reconstruct a topic's trajectory from an immutable snapshot of its
/// messages and groups. Pure: the same snapshot always yields the same
/// trajectory, and the inputs are never mutated upstream of the caller.
pub fn build_trajectory(
    topic_id: &TopicId,
    messages: Vec<Message>,
    groups: Vec<MessageGroup>,
) -> Result<Trajectory, EngineError> {
    for group in &groups {
        if &group.topic_id != topic_id {
            return Err(EngineError::TopicMismatch {
                group_id: group.id.clone(),
                expected: topic_id.clone(),
                actual: group.topic_id.clone(),
            });
        }
    }

    let mut index = GroupIndex::build(messages, &groups);
    let group_nodes = groups
        .iter()
        .map(|group| synthesize(group, index.members.remove(&group.id).unwrap_or_default()))
        .collect();

    Ok(assemble(group_nodes, index.ungrouped))
}

/// The engine's sole public read operation: fetch one topic snapshot and
/// rebuild its trajectory. Computed fresh on every call, never persisted.
pub struct TrajectoryService {
    db: Database,
}

impl TrajectoryService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(topic_id = %topic_id))]
    pub fn build(&self, topic_id: &TopicId) -> Result<Trajectory, EngineError> {
        let TopicSnapshot { messages, groups } = fetch_topic_snapshot(&self.db, topic_id)?;
        build_trajectory(topic_id, messages, groups)
    }
}
