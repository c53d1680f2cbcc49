/// SQL DDL for the braid-store database.
/// WAL mode + foreign keys enabled at connection time.
///
/// `messages.group_id` deliberately has no foreign key: a message pointing
/// at a missing group is a tolerated soft inconsistency, repaired on read
/// by the trajectory engine's fail-open policy.
pub const SCHEMA_VERSION: u32 = 1;

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS topics (
    id TEXT PRIMARY KEY,
    title TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    topic_id TEXT NOT NULL REFERENCES topics(id),
    parent_id TEXT,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    favorite INTEGER NOT NULL DEFAULT 0,
    group_id TEXT,
    model TEXT,
    provider TEXT,
    tool_calls TEXT
);

CREATE TABLE IF NOT EXISTS message_groups (
    id TEXT PRIMARY KEY,
    topic_id TEXT NOT NULL REFERENCES topics(id),
    kind TEXT NOT NULL,
    created_at TEXT NOT NULL,
    content TEXT,
    parent_message_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_messages_topic ON messages(topic_id);
CREATE INDEX IF NOT EXISTS idx_messages_topic_created ON messages(topic_id, created_at);
CREATE INDEX IF NOT EXISTS idx_messages_parent ON messages(parent_id);
CREATE INDEX IF NOT EXISTS idx_messages_group ON messages(group_id);
CREATE INDEX IF NOT EXISTS idx_groups_topic ON message_groups(topic_id);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
"#;

pub const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
"#;
