use braid_core::message::Message;
use braid_core::trajectory::{Trajectory, TrajectoryNode};

/// Merge synthesized group nodes with top-level messages into one sequence
/// ordered by ascending timestamp (a group node sorts by its anchor, a
/// plain message by its created_at).
///
/// Group nodes are pre-ordered by (anchor, id) and plain messages by
/// (created_at, id); the final pass is a single stable sort on the
/// timestamp alone. Equal-key entries therefore keep a deterministic
/// order — id order within each class, group nodes ahead of plain
/// messages — without any further special-casing.
pub fn assemble(mut group_nodes: Vec<TrajectoryNode>, mut plain: Vec<Message>) -> Trajectory {
    group_nodes.sort_by(|a, b| {
        a.timestamp()
            .cmp(&b.timestamp())
            .then_with(|| sort_id(a).cmp(sort_id(b)))
    });
    plain.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut nodes = group_nodes;
    nodes.extend(plain.into_iter().map(TrajectoryNode::Message));
    nodes.sort_by_key(TrajectoryNode::timestamp);
    nodes
}

fn sort_id(node: &TrajectoryNode) -> &str {
    match node {
        TrajectoryNode::Message(m) => m.id.as_str(),
        TrajectoryNode::CompressedGroup(n) => n.id.as_str(),
        TrajectoryNode::CompareGroup(n) => n.id.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_core::ids::{GroupId, MessageId, TopicId};
    use braid_core::message::Role;
    use braid_core::trajectory::CompressedGroupNode;
    use chrono::{DateTime, TimeZone, Utc};

    fn topic() -> TopicId {
        TopicId::from_raw("topic_test")
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    fn msg(id: &str, secs: i64) -> Message {
        let mut m = Message::new(&topic(), Role::User, id);
        m.id = MessageId::from_raw(id);
        m.created_at = at(secs);
        m
    }

    fn group_node(id: &str, secs: i64) -> TrajectoryNode {
        TrajectoryNode::CompressedGroup(CompressedGroupNode {
            id: GroupId::from_raw(id),
            content: String::new(),
            pinned_messages: vec![],
            compressed_messages: vec![],
            anchor: at(secs),
        })
    }

    fn ids(trajectory: &Trajectory) -> Vec<&str> {
        trajectory.iter().map(sort_id).collect()
    }

    #[test]
    fn interleaves_by_timestamp() {
        let out = assemble(
            vec![group_node("grp-1", 90)],
            vec![msg("msg-1", 0), msg("msg-2", 180)],
        );
        assert_eq!(ids(&out), vec!["msg-1", "grp-1", "msg-2"]);
    }

    #[test]
    fn output_timestamps_non_decreasing() {
        let out = assemble(
            vec![group_node("grp-1", 30), group_node("grp-2", 10)],
            vec![msg("msg-1", 20), msg("msg-2", 5), msg("msg-3", 30)],
        );
        for w in out.windows(2) {
            assert!(w[0].timestamp() <= w[1].timestamp());
        }
    }

    #[test]
    fn equal_anchor_groups_are_id_ordered() {
        let out = assemble(
            vec![group_node("grp-b", 10), group_node("grp-a", 10)],
            vec![],
        );
        assert_eq!(ids(&out), vec!["grp-a", "grp-b"]);
    }

    #[test]
    fn group_and_message_tie_is_deterministic() {
        let run = || {
            assemble(
                vec![group_node("grp-1", 10)],
                vec![msg("msg-1", 10)],
            )
        };
        let first = ids(&run()).join(",");
        for _ in 0..5 {
            assert_eq!(ids(&run()).join(","), first);
        }
    }

    #[test]
    fn anchor_places_group_between_messages() {
        // Anchor sits between two uncompressed messages even though the
        // group's members (not passed here) could be from anywhere.
        let out = assemble(
            vec![group_node("grp-1", 15)],
            vec![msg("msg-1", 10), msg("msg-2", 20)],
        );
        assert_eq!(ids(&out), vec!["msg-1", "grp-1", "msg-2"]);
    }

    #[test]
    fn idempotent_for_same_input() {
        let build = || {
            assemble(
                vec![group_node("grp-1", 10), group_node("grp-2", 10)],
                vec![msg("msg-1", 10), msg("msg-2", 0)],
            )
        };
        let a = serde_json::to_string(&build()).unwrap();
        let b = serde_json::to_string(&build()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_inputs_give_empty_trajectory() {
        assert!(assemble(vec![], vec![]).is_empty());
    }

    // Exercised indirectly everywhere; kept for the compare-group arm.
    #[test]
    fn sort_id_covers_all_variants() {
        let compare = TrajectoryNode::CompareGroup(braid_core::trajectory::CompareGroupNode {
            id: GroupId::from_raw("grp-c"),
            children: vec![],
            anchor: at(0),
        });
        assert_eq!(sort_id(&compare), "grp-c");
        assert_eq!(sort_id(&TrajectoryNode::Message(msg("msg-1", 0))), "msg-1");
    }
}
