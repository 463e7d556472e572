//! Component A: the hybrid vector-relational store.
//!
//! Memory rows live in an embedded SQLite database (`rusqlite`, bundled, no
//! ORM — the one this crate was built from used Diesel for an unrelated
//! chat-session schema, but nothing here benefits from a query builder since
//! every access pattern is already enumerated below). Vectors live in a
//! parallel HNSW index (`hora`), keyed by the same integer id as the row
//! table. No off-the-shelf crate in this ecosystem provides a SQL virtual
//! table with built-in vector `MATCH`/KNN syntax, so the two halves are
//! composed explicitly here and presented to callers as one store with one
//! atomicity contract.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hora::core::ann_index::ANNIndex;
use hora::core::metrics::Metric;
use hora::index::hnsw_idx::HNSWIndex;
use hora::index::hnsw_params::HNSWParams;
use parking_lot::RwLock;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use crate::error::{MemoryError, Result};
use crate::models::{DateRange, Memory, MemoryFilters, Priority, SortColumn, SortOrder};
use crate::schema;

const LOCK_RETRY_ATTEMPTS: u32 = 5;
const LOCK_RETRY_BASE_DELAY_MS: u64 = 10;

/// Everything about a memory that isn't the content or the vector itself.
#[derive(Debug, Clone)]
pub struct InsertMeta {
    pub priority: Priority,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub project_id: Option<String>,
    pub source: Option<String>,
    pub embedding_model: String,
    pub embedding_model_version: String,
    pub usage_contexts: Vec<String>,
}

/// The capability contract of the hybrid store. A narrow interface so tests
/// can swap in an in-memory fake without touching the service layer.
pub trait MemoryStore: Send + Sync {
    fn insert_memory(&self, content: &str, content_hash: &str, vector: &[f32], meta: InsertMeta) -> Result<i64>;
    fn get_memory(&self, id: i64) -> Result<Option<Memory>>;
    fn get_memory_by_hash(&self, hash: &str) -> Result<Option<Memory>>;
    fn delete_memory(&self, id: i64) -> Result<bool>;
    fn update_access_count(&self, id: i64) -> Result<()>;
    fn list_memories(
        &self,
        filters: &MemoryFilters,
        sort_by: SortColumn,
        order: SortOrder,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Memory>>;
    fn vector_search(&self, query_vec: &[f32], limit: usize, min_similarity: f32) -> Result<Vec<(i64, f32)>>;
    fn dimension(&self) -> usize;
}

/// Thin wrapper around a `hora` HNSW index that tolerates deletion (HNSW
/// graphs don't support node removal, so a delete marks the id gone from the
/// backing vector map and triggers a full rebuild on next mutation) and
/// reports similarity rather than raw distance.
///
/// Scale note: rebuilding on every insert/delete is O(n log n) in the number
/// of live vectors. That's the right trade-off for a local, single-user
/// memory store; a multi-tenant or high-churn deployment would want
/// incremental index maintenance instead.
struct VectorIndex {
    dimension: usize,
    inner: RwLock<HNSWIndex<f32, i64>>,
    vectors: RwLock<HashMap<i64, Vec<f32>>>,
}

impl VectorIndex {
    fn new(dimension: usize) -> Self {
        VectorIndex {
            dimension,
            inner: RwLock::new(HNSWIndex::new(dimension, &HNSWParams::default())),
            vectors: RwLock::new(HashMap::new()),
        }
    }

    fn insert(&self, id: i64, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(MemoryError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.vectors.write().insert(id, vector.to_vec());
        self.rebuild()
    }

    fn remove(&self, id: i64) -> Result<bool> {
        let existed = self.vectors.write().remove(&id).is_some();
        if existed {
            self.rebuild()?;
        }
        Ok(existed)
    }

    /// Seeds the index from durably-stored vectors (read back from the
    /// `vectors` table at startup) with a single rebuild rather than one per
    /// row.
    fn bulk_load(&self, items: Vec<(i64, Vec<f32>)>) -> Result<()> {
        *self.vectors.write() = items.into_iter().collect();
        self.rebuild()
    }

    fn rebuild(&self) -> Result<()> {
        let vectors = self.vectors.read();
        let mut fresh = HNSWIndex::new(self.dimension, &HNSWParams::default());
        for (id, vector) in vectors.iter() {
            fresh
                .add(vector, *id)
                .map_err(|e| MemoryError::StorageUnavailable(format!("vector index add failed: {e}")))?;
        }
        if !vectors.is_empty() {
            fresh
                .build(Metric::Euclidean)
                .map_err(|e| MemoryError::StorageUnavailable(format!("vector index build failed: {e}")))?;
        }
        *self.inner.write() = fresh;
        Ok(())
    }

    /// Returns up to `limit` `(id, similarity)` pairs with `similarity >=
    /// min_similarity`, sorted by similarity descending. The `hora` index
    /// only ever orders candidates by Euclidean distance on unit-norm
    /// vectors; cosine similarity is recomputed exactly from the retained
    /// vectors so the threshold comparison is never confused with distance.
    fn search(&self, query: &[f32], limit: usize, min_similarity: f32) -> Result<Vec<(i64, f32)>> {
        if query.len() != self.dimension {
            return Err(MemoryError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        let vectors = self.vectors.read();
        if vectors.is_empty() {
            return Ok(Vec::new());
        }
        // Oversample the HNSW candidate set generously since we re-rank by
        // exact similarity and then threshold-filter after the fact.
        let candidate_k = (limit * 4).max(limit).min(vectors.len());
        let candidate_ids = self.inner.read().search(query, candidate_k);

        let mut scored: Vec<(i64, f32)> = candidate_ids
            .into_iter()
            .filter_map(|id| vectors.get(&id).map(|v| (id, cosine_similarity(query, v))))
            .filter(|(_, sim)| *sim >= min_similarity)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn blob_to_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// A SQLite-backed implementation of [`MemoryStore`].
pub struct SqliteMemoryStore {
    conn: Mutex<Connection>,
    vector_index: VectorIndex,
    dimension: usize,
}

impl SqliteMemoryStore {
    /// Opens (creating if absent) the database at `path` and builds schema,
    /// indexes, and an empty vector index. Idempotent: safe to call against
    /// an already-initialized file.
    pub fn open(path: &Path, dimension: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| MemoryError::StorageUnavailable(format!("cannot create db directory: {e}")))?;
            }
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn, dimension)
    }

    /// Opens a private, in-memory database. Used by tests and by callers who
    /// don't want anything touching disk.
    pub fn open_in_memory(dimension: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, dimension)
    }

    fn from_connection(conn: Connection, dimension: usize) -> Result<Self> {
        conn.execute_batch(schema::ENABLE_WAL).ok(); // WAL is unavailable (and unnecessary) on :memory:
        conn.execute(schema::CREATE_MEMORIES_TABLE, [])?;
        conn.execute(schema::CREATE_VECTORS_TABLE, [])?;
        for stmt in schema::CREATE_INDEXES {
            conn.execute(stmt, [])?;
        }

        let existing = {
            let mut stmt = conn.prepare("SELECT memory_id, embedding FROM vectors")?;
            let rows = stmt.query_map([], |row| {
                let id: i64 = row.get(0)?;
                let blob: Vec<u8> = row.get(1)?;
                Ok((id, blob_to_vector(&blob)))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        let store = SqliteMemoryStore {
            conn: Mutex::new(conn),
            vector_index: VectorIndex::new(dimension),
            dimension,
        };
        store.vector_index.bulk_load(existing)?;
        Ok(store)
    }

    fn with_retry<T>(&self, mut f: impl FnMut(&Connection) -> rusqlite::Result<T>) -> Result<T> {
        let mut attempt = 0;
        loop {
            let conn = self.conn.lock().expect("memory store connection mutex poisoned");
            match f(&conn) {
                Ok(v) => return Ok(v),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::DatabaseBusy && attempt < LOCK_RETRY_ATTEMPTS =>
                {
                    drop(conn);
                    attempt += 1;
                    thread::sleep(Duration::from_millis(LOCK_RETRY_BASE_DELAY_MS * attempt as u64));
                    continue;
                }
                Err(e) => return Err(MemoryError::StorageUnavailable(e.to_string())),
            }
        }
    }
}

fn row_to_memory(row: &Row) -> rusqlite::Result<Memory> {
    let priority_token: String = row.get("priority")?;
    let tags_json: String = row.get("tags")?;
    let usage_contexts_json: String = row.get("usage_contexts")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let last_accessed_at: Option<String> = row.get("last_accessed_at")?;

    let priority = Priority::parse(&priority_token).unwrap_or(Priority::Normal);
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    let usage_contexts: Vec<String> = serde_json::from_str(&usage_contexts_json).unwrap_or_default();

    Ok(Memory {
        id: row.get("id")?,
        content: row.get("content")?,
        content_hash: row.get("content_hash")?,
        priority,
        category: row.get("category")?,
        tags,
        project_id: row.get("project_id")?,
        source: row.get("source")?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
        embedding_model: row.get("embedding_model")?,
        embedding_model_version: row.get("embedding_model_version")?,
        embedding_dimension: row.get::<_, i64>("embedding_dimension")? as usize,
        access_count: row.get("access_count")?,
        last_accessed_at: last_accessed_at.map(|s| parse_timestamp(&s)),
        usage_contexts,
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl MemoryStore for SqliteMemoryStore {
    fn insert_memory(&self, content: &str, content_hash: &str, vector: &[f32], meta: InsertMeta) -> Result<i64> {
        if vector.len() != self.dimension {
            return Err(MemoryError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        let now = Utc::now().to_rfc3339();
        let tags_json = serde_json::to_string(&meta.tags)?;
        let usage_contexts_json = serde_json::to_string(&meta.usage_contexts)?;

        let blob = vector_to_blob(vector);

        let id = self.with_retry(|conn| {
            let tx = conn.unchecked_transaction()?;
            let result = (|| {
                let id: i64 = tx.query_row(
                    "INSERT INTO memories (
                        content, content_hash, priority, category, tags, project_id, source,
                        created_at, updated_at, embedding_model, embedding_model_version,
                        embedding_dimension, access_count, last_accessed_at, usage_contexts
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9, ?10, ?11, 0, NULL, ?12)
                    RETURNING id",
                    params![
                        content,
                        content_hash,
                        meta.priority.as_str(),
                        meta.category,
                        tags_json,
                        meta.project_id,
                        meta.source,
                        now,
                        meta.embedding_model,
                        meta.embedding_model_version,
                        vector.len() as i64,
                        usage_contexts_json,
                    ],
                    |row| row.get::<_, i64>(0),
                )?;
                tx.execute(
                    "INSERT INTO vectors (memory_id, embedding) VALUES (?1, ?2)",
                    params![id, blob],
                )?;
                Ok::<i64, rusqlite::Error>(id)
            })();
            match result {
                Ok(id) => {
                    tx.commit()?;
                    Ok(id)
                }
                Err(e) => {
                    tx.rollback().ok();
                    Err(e)
                }
            }
        });

        let id = match id {
            Ok(id) => id,
            Err(MemoryError::StorageUnavailable(msg)) if msg.contains("UNIQUE constraint failed") => {
                return Err(MemoryError::DuplicateHash(content_hash.to_string()));
            }
            Err(e) => return Err(e),
        };

        // Row and vector blob are durably committed; now add to the
        // in-memory ANN structure. If this fails, roll the durable write
        // back too so readers never observe a memory with a missing vector.
        if let Err(e) = self.vector_index.insert(id, vector) {
            self.with_retry(|conn| conn.execute("DELETE FROM memories WHERE id = ?1", params![id]))
                .ok();
            self.with_retry(|conn| conn.execute("DELETE FROM vectors WHERE memory_id = ?1", params![id]))
                .ok();
            return Err(e);
        }

        Ok(id)
    }

    fn get_memory(&self, id: i64) -> Result<Option<Memory>> {
        self.with_retry(|conn| {
            conn.query_row("SELECT * FROM memories WHERE id = ?1", params![id], row_to_memory)
                .optional()
        })
    }

    fn get_memory_by_hash(&self, hash: &str) -> Result<Option<Memory>> {
        self.with_retry(|conn| {
            conn.query_row(
                "SELECT * FROM memories WHERE content_hash = ?1",
                params![hash],
                row_to_memory,
            )
            .optional()
        })
    }

    fn delete_memory(&self, id: i64) -> Result<bool> {
        let row_existed = self.with_retry(|conn| {
            let tx = conn.unchecked_transaction()?;
            let changed = tx.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
            tx.execute("DELETE FROM vectors WHERE memory_id = ?1", params![id])?;
            tx.commit()?;
            Ok(changed > 0)
        })?;
        if row_existed {
            self.vector_index.remove(id)?;
        }
        Ok(row_existed)
    }

    fn update_access_count(&self, id: i64) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.with_retry(|conn| {
            conn.execute(
                "UPDATE memories SET access_count = access_count + 1, last_accessed_at = ?2 WHERE id = ?1",
                params![id, now],
            )
        })?;
        Ok(())
    }

    fn list_memories(
        &self,
        filters: &MemoryFilters,
        sort_by: SortColumn,
        order: SortOrder,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Memory>> {
        let (where_clause, bind_values) = build_where_clause(filters);
        let order_sql = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let query = format!(
            "SELECT * FROM memories {where_clause} ORDER BY {col} {order_sql} LIMIT ?{limit_idx} OFFSET ?{offset_idx}",
            col = sort_by.column_name(),
            limit_idx = bind_values.len() + 1,
            offset_idx = bind_values.len() + 2,
        );

        self.with_retry(|conn| {
            let mut stmt = conn.prepare(&query)?;
            let mut all_params: Vec<&dyn rusqlite::ToSql> = bind_values.iter().map(|v| v.as_ref()).collect();
            let limit_i64 = limit as i64;
            let offset_i64 = offset as i64;
            all_params.push(&limit_i64);
            all_params.push(&offset_i64);
            let rows = stmt.query_map(all_params.as_slice(), row_to_memory)?;
            let mut out = Vec::new();
            for row in rows {
                match row {
                    Ok(m) => out.push(m),
                    Err(e) => warn!("skipping corrupt memory row during list: {e}"),
                }
            }
            Ok(out)
        })
    }

    fn vector_search(&self, query_vec: &[f32], limit: usize, min_similarity: f32) -> Result<Vec<(i64, f32)>> {
        debug!(limit, min_similarity, "running vector search");
        self.vector_index.search(query_vec, limit, min_similarity)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Builds a `WHERE ...` clause (or empty string) plus the positional bind
/// values for [`MemoryFilters`]. Tag matching is OR'd internally via a
/// parenthesized group of `LIKE` substring checks against the JSON-quoted
/// tag token, matching the listing-level semantics used by the service.
fn build_where_clause(filters: &MemoryFilters) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(priority) = &filters.priority {
        clauses.push(format!("priority = ?{}", values.len() + 1));
        values.push(Box::new(priority.as_str().to_string()));
    }
    if let Some(project_id) = &filters.project_id {
        clauses.push(format!("project_id = ?{}", values.len() + 1));
        values.push(Box::new(project_id.clone()));
    }
    if !filters.tags.is_empty() {
        let tag_clauses: Vec<String> = filters
            .tags
            .iter()
            .map(|tag| {
                values.push(Box::new(format!("%\"{tag}\"%")));
                format!("tags LIKE ?{}", values.len())
            })
            .collect();
        clauses.push(format!("({})", tag_clauses.join(" OR ")));
    }
    if let Some(DateRange { start, end }) = &filters.date_range {
        if let Some(start) = start {
            clauses.push(format!("created_at >= ?{}", values.len() + 1));
            values.push(Box::new(start.to_rfc3339()));
        }
        if let Some(end) = end {
            clauses.push(format!("created_at <= ?{}", values.len() + 1));
            values.push(Box::new(end.to_rfc3339()));
        }
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!("WHERE {}", clauses.join(" AND ")), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_meta() -> InsertMeta {
        InsertMeta {
            priority: Priority::Normal,
            category: None,
            tags: vec!["alpha".to_string(), "beta".to_string()],
            project_id: Some("proj-1".to_string()),
            source: None,
            embedding_model: "stub".to_string(),
            embedding_model_version: "1".to_string(),
            usage_contexts: vec![],
        }
    }

    fn unit_vector(dimension: usize, hot_index: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; dimension];
        v[hot_index % dimension] = 1.0;
        v
    }

    #[test]
    fn test_insert_and_get_memory_round_trips() {
        let store = SqliteMemoryStore::open_in_memory(4).unwrap();
        let vector = unit_vector(4, 0);
        let id = store
            .insert_memory("hello world", "hash-1", &vector, test_meta())
            .unwrap();

        let fetched = store.get_memory(id).unwrap().expect("memory should exist");
        assert_eq!(fetched.content, "hello world");
        assert_eq!(fetched.content_hash, "hash-1");
        assert_eq!(fetched.tags, vec!["alpha", "beta"]);
        assert_eq!(fetched.access_count, 0);
    }

    #[test]
    fn test_duplicate_hash_is_rejected() {
        let store = SqliteMemoryStore::open_in_memory(4).unwrap();
        let vector = unit_vector(4, 0);
        store.insert_memory("hello", "dup-hash", &vector, test_meta()).unwrap();

        let err = store
            .insert_memory("hello again", "dup-hash", &vector, test_meta())
            .unwrap_err();
        assert!(matches!(err, MemoryError::DuplicateHash(_)));
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let store = SqliteMemoryStore::open_in_memory(4).unwrap();
        let wrong = vec![1.0f32, 0.0, 0.0];
        let err = store
            .insert_memory("hello", "hash-x", &wrong, test_meta())
            .unwrap_err();
        assert!(matches!(err, MemoryError::DimensionMismatch { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_delete_then_get_returns_absent_and_delete_is_idempotent() {
        let store = SqliteMemoryStore::open_in_memory(4).unwrap();
        let vector = unit_vector(4, 0);
        let id = store.insert_memory("hello", "hash-2", &vector, test_meta()).unwrap();

        assert!(store.delete_memory(id).unwrap());
        assert!(store.get_memory(id).unwrap().is_none());
        assert!(!store.delete_memory(id).unwrap());
    }

    #[test]
    fn test_update_access_count_increments_and_stamps_last_accessed() {
        let store = SqliteMemoryStore::open_in_memory(4).unwrap();
        let vector = unit_vector(4, 0);
        let id = store.insert_memory("hello", "hash-3", &vector, test_meta()).unwrap();

        store.update_access_count(id).unwrap();
        store.update_access_count(id).unwrap();
        let memory = store.get_memory(id).unwrap().unwrap();
        assert_eq!(memory.access_count, 2);
        assert!(memory.last_accessed_at.is_some());
    }

    #[test]
    fn test_vector_search_orders_by_similarity_and_respects_threshold() {
        let store = SqliteMemoryStore::open_in_memory(4).unwrap();
        let close = unit_vector(4, 0);
        let mut near = vec![0.0f32; 4];
        near[0] = 0.9;
        near[1] = (1.0 - 0.81f32).sqrt();
        let far = unit_vector(4, 2);

        let id_close = store.insert_memory("close", "h-close", &close, test_meta()).unwrap();
        let _id_near = store.insert_memory("near", "h-near", &near, test_meta()).unwrap();
        let _id_far = store.insert_memory("far", "h-far", &far, test_meta()).unwrap();

        let results = store.vector_search(&close, 10, 0.95).unwrap();
        assert_eq!(results[0].0, id_close);
        assert!(results.iter().all(|(_, sim)| *sim >= 0.95));
    }

    #[test]
    fn test_list_memories_filters_by_tag_and_priority() {
        let store = SqliteMemoryStore::open_in_memory(4).unwrap();
        let mut meta_high = test_meta();
        meta_high.priority = Priority::High;
        meta_high.tags = vec!["paging".to_string()];
        store
            .insert_memory("high priority paging", "h-a", &unit_vector(4, 0), meta_high)
            .unwrap();

        let mut meta_low = test_meta();
        meta_low.priority = Priority::Low;
        meta_low.tags = vec!["other".to_string()];
        store
            .insert_memory("low priority other", "h-b", &unit_vector(4, 1), meta_low)
            .unwrap();

        let filters = MemoryFilters {
            priority: Some(Priority::High),
            tags: vec!["paging".to_string()],
            ..Default::default()
        };
        let results = store
            .list_memories(&filters, SortColumn::CreatedAt, SortOrder::Desc, 10, 0)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "high priority paging");
    }

    #[test]
    fn test_list_memories_pagination_has_more_and_disjoint_pages() {
        let store = SqliteMemoryStore::open_in_memory(4).unwrap();
        for i in 0..15 {
            let mut meta = test_meta();
            meta.tags = vec!["paging".to_string()];
            store
                .insert_memory(&format!("memory {i}"), &format!("hash-{i}"), &unit_vector(4, i), meta)
                .unwrap();
        }

        let filters = MemoryFilters {
            tags: vec!["paging".to_string()],
            ..Default::default()
        };
        let page1 = store
            .list_memories(&filters, SortColumn::CreatedAt, SortOrder::Asc, 10, 0)
            .unwrap();
        let page2 = store
            .list_memories(&filters, SortColumn::CreatedAt, SortOrder::Asc, 10, 10)
            .unwrap();

        assert_eq!(page1.len(), 10);
        assert_eq!(page2.len(), 5);
        let ids1: std::collections::HashSet<_> = page1.iter().map(|m| m.id).collect();
        let ids2: std::collections::HashSet<_> = page2.iter().map(|m| m.id).collect();
        assert!(ids1.is_disjoint(&ids2));
    }
}
