use braid_core::ids::{GroupId, TopicId};
use braid_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Store-access failure, propagated as-is. Retries, if any, belong to
    /// the accessor/transport layer.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A loaded group names a different topic than the one requested.
    /// The whole build fails; a partially-correct trajectory is worse
    /// than a visible failure for conversation reconstruction.
    #[error("group {group_id} belongs to topic {actual}, expected {expected}")]
    TopicMismatch {
        group_id: GroupId,
        expected: TopicId,
        actual: TopicId,
    },
}
