use std::collections::HashMap;

use tracing::debug;

use braid_core::group::MessageGroup;
use braid_core::ids::GroupId;
use braid_core::message::Message;

/// Output of the grouping pass: each loaded group's members in member
/// order, plus everything left visible at top level.
pub struct GroupIndex {
    pub members: HashMap<GroupId, Vec<Message>>,
    pub ungrouped: Vec<Message>,
}

impl GroupIndex {
    /// Partition a topic's messages by group membership.
    ///
    /// Every loaded group gets an entry, including zero-member groups. A
    /// message whose group_id does not resolve to a loaded group stays
    /// ungrouped rather than vanishing — consistency repair, not an error.
    /// Member order is created_at ascending, ties broken by message id.
    pub fn build(messages: Vec<Message>, groups: &[MessageGroup]) -> Self {
        let mut members: HashMap<GroupId, Vec<Message>> =
            groups.iter().map(|g| (g.id.clone(), Vec::new())).collect();
        let mut ungrouped = Vec::new();

        for message in messages {
            match message.group_id.clone() {
                Some(group_id) => match members.get_mut(&group_id) {
                    Some(bucket) => bucket.push(message),
                    None => {
                        debug!(
                            message_id = %message.id,
                            group_id = %group_id,
                            "message references unknown group, keeping at top level"
                        );
                        ungrouped.push(message);
                    }
                },
                None => ungrouped.push(message),
            }
        }

        for bucket in members.values_mut() {
            bucket.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        Self { members, ungrouped }
    }
}
