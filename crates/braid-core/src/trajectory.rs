use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::GroupId;
use crate::message::Message;

/// The linear, render/inference-ready sequence derived from a topic's
/// branching messages and groups. Computed fresh on every read; never
/// persisted.
pub type Trajectory = Vec<TrajectoryNode>;

/// One entry in a trajectory. Tagged so consumers can pattern-match
/// without shape heuristics.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TrajectoryNode {
    #[serde(rename = "message")]
    Message(Message),
    #[serde(rename = "compressedGroup")]
    CompressedGroup(CompressedGroupNode),
    #[serde(rename = "compareGroup")]
    CompareGroup(CompareGroupNode),
}

/// Replaces every member of a compression group with a single summary
/// entry. Members keep their original `parent_id` so lineage can still be
/// walked inside the compressed blob.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompressedGroupNode {
    pub id: GroupId,
    pub content: String,
    pub pinned_messages: Vec<Message>,
    pub compressed_messages: Vec<Message>,
    pub anchor: DateTime<Utc>,
}

/// Replaces a set of sibling alternate responses with one multi-child
/// entry. Children carry full message data (model, provider, content,
/// favorite) unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompareGroupNode {
    pub id: GroupId,
    pub children: Vec<Message>,
    pub anchor: DateTime<Utc>,
}

impl TrajectoryNode {
    /// The assembler's sort key: a plain message's creation time, a group
    /// node's anchor.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Message(msg) => msg.created_at,
            Self::CompressedGroup(node) => node.anchor,
            Self::CompareGroup(node) => node.anchor,
        }
    }

    /// How many stored messages this entry carries.
    pub fn message_count(&self) -> usize {
        match self {
            Self::Message(_) => 1,
            Self::CompressedGroup(node) => node.compressed_messages.len(),
            Self::CompareGroup(node) => node.children.len(),
        }
    }
}
