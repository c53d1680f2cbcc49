pub mod group;
pub mod ids;
pub mod message;
pub mod trajectory;

pub use group::{GroupKind, MessageGroup};
pub use message::{Message, Role, ToolCallBlock};
pub use trajectory::{CompareGroupNode, CompressedGroupNode, Trajectory, TrajectoryNode};
