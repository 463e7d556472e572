//! SQL schema for the relational half of the hybrid store.
//!
//! There is no ORM here (the chat-session persistence this crate was built
//! from used Diesel; the memory schema below has no use for a query builder
//! since every access pattern is already enumerated by `crate::store`), just
//! plain DDL executed once at `initialize()` time.

/// Schema version stamped into `memories` via a pragma-free sentinel row is
/// unnecessary for a single-table schema with no migrations yet; kept here
/// as a constant so a future migration has an obvious place to start.
pub const SCHEMA_VERSION: i32 = 1;

pub const CREATE_MEMORIES_TABLE: &str = "
CREATE TABLE IF NOT EXISTS memories (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    content                 TEXT NOT NULL,
    content_hash            TEXT NOT NULL UNIQUE,
    priority                TEXT NOT NULL DEFAULT 'NORMAL',
    category                TEXT,
    tags                    TEXT NOT NULL DEFAULT '[]',
    project_id              TEXT,
    source                  TEXT,
    created_at              TEXT NOT NULL,
    updated_at              TEXT NOT NULL,
    embedding_model         TEXT NOT NULL,
    embedding_model_version TEXT NOT NULL,
    embedding_dimension     INTEGER NOT NULL,
    access_count            INTEGER NOT NULL DEFAULT 0,
    last_accessed_at        TEXT,
    usage_contexts          TEXT NOT NULL DEFAULT '[]'
);
";

pub const CREATE_VECTORS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS vectors (
    memory_id INTEGER PRIMARY KEY,
    embedding BLOB NOT NULL
);
";

pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_memories_priority ON memories(priority);",
    "CREATE INDEX IF NOT EXISTS idx_memories_project_id ON memories(project_id);",
    "CREATE INDEX IF NOT EXISTS idx_memories_created_at ON memories(created_at);",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_memories_content_hash ON memories(content_hash);",
];

pub const ENABLE_WAL: &str = "PRAGMA journal_mode=WAL;";
