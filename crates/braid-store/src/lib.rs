pub mod database;
pub mod error;
pub mod groups;
pub mod messages;
pub mod row_helpers;
pub mod schema;
pub mod snapshot;
pub mod topics;

pub use database::Database;
pub use error::StoreError;
pub use snapshot::{fetch_topic_snapshot, TopicSnapshot};
