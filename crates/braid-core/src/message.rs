use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, MessageId, ToolCallId, TopicId};

/// Speaker kind for a stored message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "tool" => Ok(Self::Tool),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A tool invocation attached to an assistant message.
/// Carried verbatim through trajectory reconstruction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallBlock {
    pub id: ToolCallId,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// A node in a topic's branching conversation forest.
///
/// Messages reference their parent by id rather than nesting: multiple
/// messages may share a parent (regenerations, parallel responses), and
/// lineage reconstruction is a consumer concern. `parent_id` is never
/// stripped, even when the message is folded into a group node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub topic_id: TopicId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<MessageId>,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorite: bool,
    /// Membership in a compression or parallel group. A member never
    /// appears as a standalone top-level trajectory entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallBlock>,
}

impl Message {
    /// Create a root message with a fresh id, stamped now.
    pub fn new(topic_id: &TopicId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            topic_id: topic_id.clone(),
            parent_id: None,
            role,
            content: content.into(),
            created_at: Utc::now(),
            favorite: false,
            group_id: None,
            model: None,
            provider: None,
            tool_calls: Vec::new(),
        }
    }

    /// Create a reply to this message in the same topic.
    pub fn reply(&self, role: Role, content: impl Into<String>) -> Self {
        let mut msg = Self::new(&self.topic_id, role, content);
        msg.parent_id = Some(self.id.clone());
        msg
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
