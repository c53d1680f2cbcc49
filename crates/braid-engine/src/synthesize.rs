use braid_core::group::{GroupKind, MessageGroup};
use braid_core::message::Message;
use braid_core::trajectory::{CompareGroupNode, CompressedGroupNode, TrajectoryNode};

/// Convert one group and its members into the trajectory node that
/// replaces them.
///
/// Members arrive in member order and keep their original parent_id, even
/// when the parent is itself compressed or outside the group — lineage is
/// never stripped. Membership is trusted as assigned upstream; a parallel
/// group's parent_message_id is not validated against its children.
pub fn synthesize(group: &MessageGroup, members: Vec<Message>) -> TrajectoryNode {
    match group.kind {
        GroupKind::Compression => {
            let pinned_messages = members.iter().filter(|m| m.favorite).cloned().collect();
            TrajectoryNode::CompressedGroup(CompressedGroupNode {
                id: group.id.clone(),
                content: group.content.clone().unwrap_or_default(),
                pinned_messages,
                compressed_messages: members,
                anchor: group.created_at,
            })
        }
        // Children carry their favorite flags unchanged; the node does not
        // aggregate them.
        GroupKind::Parallel => TrajectoryNode::CompareGroup(CompareGroupNode {
            id: group.id.clone(),
            children: members,
            anchor: group.created_at,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_core::ids::{MessageId, TopicId};
    use braid_core::message::Role;
    use chrono::{TimeZone, Utc};

    fn topic() -> TopicId {
        TopicId::from_raw("topic_test")
    }

    fn msg(id: &str, secs: i64) -> Message {
        let mut m = Message::new(&topic(), Role::Assistant, id);
        m.id = MessageId::from_raw(id);
        m.created_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
            + chrono::Duration::seconds(secs);
        m
    }

    #[test]
    fn compression_extracts_pinned_subsequence() {
        let group = MessageGroup::compression(&topic(), "Summary");
        let mut m1 = msg("msg-1", 0);
        m1.favorite = true;
        let m2 = msg("msg-2", 1);
        let mut m3 = msg("msg-3", 2);
        m3.favorite = true;

        let node = synthesize(&group, vec![m1, m2, m3]);
        match node {
            TrajectoryNode::CompressedGroup(n) => {
                assert_eq!(n.compressed_messages.len(), 3);
                assert_eq!(n.pinned_messages.len(), 2);
                let pinned: Vec<&str> =
                    n.pinned_messages.iter().map(|m| m.id.as_str()).collect();
                assert_eq!(pinned, vec!["msg-1", "msg-3"]);
                assert_eq!(n.content, "Summary");
            }
            other => panic!("expected compressed group, got {other:?}"),
        }
    }

    #[test]
    fn compression_missing_content_becomes_empty() {
        let mut group = MessageGroup::compression(&topic(), "");
        group.content = None;
        let node = synthesize(&group, vec![msg("msg-1", 0)]);
        match node {
            TrajectoryNode::CompressedGroup(n) => assert_eq!(n.content, ""),
            other => panic!("expected compressed group, got {other:?}"),
        }
    }

    #[test]
    fn compression_zero_members_still_emits_node() {
        let group = MessageGroup::compression(&topic(), "Summary");
        let node = synthesize(&group, vec![]);
        match node {
            TrajectoryNode::CompressedGroup(n) => {
                assert!(n.pinned_messages.is_empty());
                assert!(n.compressed_messages.is_empty());
                assert_eq!(n.anchor, group.created_at);
            }
            other => panic!("expected compressed group, got {other:?}"),
        }
    }

    #[test]
    fn anchor_is_group_timestamp_not_member_timestamp() {
        let mut group = MessageGroup::compression(&topic(), "Summary");
        group.created_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 1, 30).unwrap();
        let node = synthesize(&group, vec![msg("msg-1", 0)]);
        assert_eq!(node.timestamp(), group.created_at);
    }

    #[test]
    fn parallel_children_in_member_order() {
        let group = MessageGroup::parallel(&topic(), &MessageId::from_raw("user-a"));
        let mut a = msg("model-a", 60);
        a.model = Some("model-a-v1".into());
        let mut b = msg("model-b", 61);
        b.model = Some("model-b-v1".into());

        let node = synthesize(&group, vec![a, b]);
        match node {
            TrajectoryNode::CompareGroup(n) => {
                let ids: Vec<&str> = n.children.iter().map(|m| m.id.as_str()).collect();
                assert_eq!(ids, vec!["model-a", "model-b"]);
                assert_eq!(n.children[0].model.as_deref(), Some("model-a-v1"));
            }
            other => panic!("expected compare group, got {other:?}"),
        }
    }

    #[test]
    fn parallel_favorite_flags_carried_not_aggregated() {
        let group = MessageGroup::parallel(&topic(), &MessageId::from_raw("user-a"));
        let mut fav = msg("model-a", 60);
        fav.favorite = true;
        let plain = msg("model-b", 61);

        let node = synthesize(&group, vec![fav, plain]);
        match node {
            TrajectoryNode::CompareGroup(n) => {
                assert!(n.children[0].favorite);
                assert!(!n.children[1].favorite);
            }
            other => panic!("expected compare group, got {other:?}"),
        }
    }

    #[test]
    fn members_keep_parent_lineage() {
        let group = MessageGroup::compression(&topic(), "Summary");
        let mut child = msg("msg-2", 1);
        child.parent_id = Some(MessageId::from_raw("msg-1"));

        let node = synthesize(&group, vec![child]);
        match node {
            TrajectoryNode::CompressedGroup(n) => {
                assert_eq!(
                    n.compressed_messages[0].parent_id.as_ref().unwrap().as_str(),
                    "msg-1"
                );
            }
            other => panic!("expected compressed group, got {other:?}"),
        }
    }
}
