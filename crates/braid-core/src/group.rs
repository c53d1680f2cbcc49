use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, MessageId, TopicId};

/// Closed set of group mechanisms. Synthesis matches exhaustively on this,
/// so an unrecognized kind can only surface at the storage row boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Compression,
    Parallel,
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compression => write!(f, "compression"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

impl std::str::FromStr for GroupKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compression" => Ok(Self::Compression),
            "parallel" => Ok(Self::Parallel),
            other => Err(format!("unknown group kind: {other}")),
        }
    }
}

/// A replacement unit for one or more messages.
///
/// `created_at` is the group's own anchor timestamp, independent of any
/// member's timestamp; the assembler places the group node by it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageGroup {
    pub id: GroupId,
    pub topic_id: TopicId,
    pub kind: GroupKind,
    pub created_at: DateTime<Utc>,
    /// Summary text. Compression groups only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// The message all members branch from. Parallel groups only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<MessageId>,
}

impl MessageGroup {
    pub fn compression(topic_id: &TopicId, content: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(),
            topic_id: topic_id.clone(),
            kind: GroupKind::Compression,
            created_at: Utc::now(),
            content: Some(content.into()),
            parent_message_id: None,
        }
    }

    pub fn parallel(topic_id: &TopicId, parent_message_id: &MessageId) -> Self {
        Self {
            id: GroupId::new(),
            topic_id: topic_id.clone(),
            kind: GroupKind::Parallel,
            created_at: Utc::now(),
            content: None,
            parent_message_id: Some(parent_message_id.clone()),
        }
    }
}
