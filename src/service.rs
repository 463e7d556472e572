//! Component D: the memory service.
//!
//! Orchestrates the store (A), the embedding pipeline (B), and the scorer
//! (C) into the five user-visible operations, and owns the dedup policy
//! that the other three components know nothing about.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::EmbeddingCache;
use crate::config::Config;
use crate::embedding::EmbeddingModel;
use crate::error::{MemoryError, Result};
use crate::models::{
    DeleteResult, ListResult, Memory, MemoryFilters, MemoryLocator, NearDuplicate, NewMemory, ScoredMemory,
    SearchResult, SortColumn, SortOrder, StoreResult,
};
use crate::scoring::{self, ScoringWeights};
use crate::store::{InsertMeta, MemoryStore, SqliteMemoryStore};

/// Search `limit` is clamped into this range regardless of what a caller
/// asks for (mirrors the `int[1..100]` constraint on the `search_memory`
/// operation contract).
const SEARCH_LIMIT_MAX: usize = 100;
/// `list_memories` accepts a wider range since it does no embedding work.
const LIST_LIMIT_MAX: usize = 500;
/// How many candidates `store_memory`'s near-duplicate probe considers.
const NEAR_DUPLICATE_PROBE_LIMIT: usize = 5;
/// Oversampling factor applied to `search_memory`'s vector-search limit so
/// post-filtering has headroom before truncating to the requested limit.
const SEARCH_OVERSAMPLE_FACTOR: usize = 2;

fn clamp_limit(limit: usize, max: usize) -> usize {
    limit.clamp(1, max)
}

/// Orchestrates store + pipeline + scorer behind the five public operations.
/// Both dependencies are trait objects (narrow capability contracts — see
/// [`MemoryStore`] and [`EmbeddingModel`]) so tests can swap in an
/// in-memory store and a deterministic model without touching this type.
pub struct MemoryService {
    store: Arc<dyn MemoryStore>,
    model: Arc<dyn EmbeddingModel>,
    cache: EmbeddingCache,
    scoring_weights: ScoringWeights,
    similarity_threshold: f32,
    dedup_auto_check: bool,
    dedup_similarity_threshold: f32,
    default_limit: usize,
}

impl MemoryService {
    /// Assembles a service from already-constructed components. Prefer
    /// [`build_service`] when starting from a [`Config`]; this constructor
    /// exists for tests that want to inject a fake store or model.
    pub fn new(
        store: Arc<dyn MemoryStore>,
        model: Arc<dyn EmbeddingModel>,
        cache_capacity: usize,
        scoring_weights: ScoringWeights,
        similarity_threshold: f32,
        dedup_auto_check: bool,
        dedup_similarity_threshold: f32,
        default_limit: usize,
    ) -> Self {
        MemoryService {
            store,
            model,
            cache: EmbeddingCache::new(cache_capacity),
            scoring_weights,
            similarity_threshold,
            dedup_auto_check,
            dedup_similarity_threshold,
            default_limit,
        }
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Stores a new memory, running the two-stage dedup policy described in
    /// the module-level docs of `crate::store` and `crate::cache`:
    /// exact-hash short-circuit first, then an advisory near-duplicate
    /// probe that never blocks the insert.
    pub fn store_memory(&self, new: NewMemory) -> Result<StoreResult> {
        if new.content.trim().is_empty() {
            return Err(MemoryError::InvalidInput("content cannot be empty".to_string()));
        }

        let content_hash = sha256::digest(new.content.as_str());

        if let Some(existing) = self.store.get_memory_by_hash(&content_hash)? {
            info!(memory_id = existing.id, "exact duplicate on store, skipping embedding");
            return Ok(StoreResult {
                success: true,
                memory_id: existing.id,
                duplicate: true,
                near_duplicate: None,
            });
        }

        let embedding = match self.cache.get(&content_hash) {
            Some(vec) => {
                debug!(hash = %content_hash, "embedding cache hit");
                vec
            }
            None => {
                debug!(hash = %content_hash, "embedding cache miss");
                let vec = self.model.embed(&new.content)?;
                self.cache.set(&content_hash, vec.clone());
                vec
            }
        };

        let near_duplicate = if self.dedup_auto_check {
            self.check_near_duplicate(&embedding, &content_hash)?
        } else {
            None
        };

        let model_info = self.model.model_info();
        let meta = InsertMeta {
            priority: new.priority,
            category: new.category,
            tags: new.tags,
            project_id: new.project_id,
            source: new.source,
            embedding_model: model_info.name,
            embedding_model_version: model_info.version,
            usage_contexts: new.usage_contexts,
        };

        let memory_id = match self.store.insert_memory(&new.content, &content_hash, &embedding, meta) {
            Ok(id) => id,
            // Defensive: a concurrent writer could have inserted the same
            // hash between our probe above and this insert. Recovered here
            // rather than propagated, same as the hash short-circuit above.
            Err(MemoryError::DuplicateHash(_)) => {
                let existing = self
                    .store
                    .get_memory_by_hash(&content_hash)?
                    .ok_or_else(|| MemoryError::Internal("duplicate hash reported but row not found".to_string()))?;
                return Ok(StoreResult {
                    success: true,
                    memory_id: existing.id,
                    duplicate: true,
                    near_duplicate: None,
                });
            }
            Err(e) => return Err(e),
        };

        info!(memory_id, "stored new memory");
        Ok(StoreResult {
            success: true,
            memory_id,
            duplicate: false,
            near_duplicate,
        })
    }

    fn check_near_duplicate(&self, embedding: &[f32], content_hash: &str) -> Result<Option<NearDuplicate>> {
        let candidates =
            self.store
                .vector_search(embedding, NEAR_DUPLICATE_PROBE_LIMIT, self.dedup_similarity_threshold)?;

        for (id, similarity) in candidates {
            let Some(candidate) = self.store.get_memory(id)? else {
                continue;
            };
            if candidate.content_hash == content_hash {
                continue;
            }
            debug!(memory_id = id, similarity, "near-duplicate found on store");
            return Ok(Some(NearDuplicate {
                memory_id: id,
                similarity,
                suggestion: "Consider merging with the existing memory".to_string(),
            }));
        }
        Ok(None)
    }

    /// Embeds `query`, runs an oversampled vector search, hydrates and
    /// ranks the candidates, then applies the structured post-filters.
    /// `limit` is clamped into `[1, 100]`.
    pub fn search_memory(&self, query: &str, limit: usize, filters: &MemoryFilters) -> Result<SearchResult> {
        if query.trim().is_empty() {
            return Err(MemoryError::InvalidInput("query cannot be empty".to_string()));
        }
        let limit = clamp_limit(limit, SEARCH_LIMIT_MAX);

        let query_vec = self.model.embed(query)?;
        let search_limit = limit * SEARCH_OVERSAMPLE_FACTOR;
        let candidates = self.store.vector_search(&query_vec, search_limit, self.similarity_threshold)?;

        if candidates.is_empty() {
            return Ok(SearchResult {
                success: true,
                memories: Vec::new(),
                total: 0,
                limit,
            });
        }

        let mut hydrated: Vec<(Memory, f32)> = Vec::with_capacity(candidates.len());
        for (id, similarity) in candidates {
            match self.store.get_memory(id)? {
                Some(memory) => hydrated.push((memory, similarity)),
                None => warn!(memory_id = id, "vector search candidate has no row, skipping"),
            }
        }

        let now = Utc::now();
        let ranked = scoring::rank(hydrated, &self.scoring_weights, now);
        let mut filtered = apply_post_filters(ranked, filters);
        filtered.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        filtered.truncate(limit);

        Ok(SearchResult {
            success: true,
            total: filtered.len(),
            memories: filtered,
            limit,
        })
    }

    /// Thin wrapper over `store.list_memories`: requests one extra row to
    /// derive `has_more` without a separate `COUNT(*)` query, then
    /// truncates it back off. No embedding or scoring work.
    pub fn list_memories(
        &self,
        filters: &MemoryFilters,
        sort_by: SortColumn,
        order: SortOrder,
        limit: usize,
        offset: usize,
    ) -> Result<ListResult> {
        let limit = clamp_limit(limit, LIST_LIMIT_MAX);
        let mut memories = self.store.list_memories(filters, sort_by, order, limit + 1, offset)?;

        let has_more = memories.len() > limit;
        memories.truncate(limit);

        Ok(ListResult {
            success: true,
            total: memories.len(),
            memories,
            limit,
            offset,
            has_more,
        })
    }

    /// Deletes by id or by content hash (resolved to an id first). Absence
    /// is a normal `{success: false}` outcome, never an error.
    pub fn delete_memory(&self, locator: MemoryLocator) -> Result<DeleteResult> {
        let id = match locator {
            MemoryLocator::Id(id) => id,
            MemoryLocator::ContentHash(hash) => match self.store.get_memory_by_hash(&hash)? {
                Some(memory) => memory.id,
                None => {
                    warn!(hash = %hash, "delete_memory: no memory for content hash");
                    return Ok(DeleteResult {
                        success: false,
                        memory_id: None,
                    });
                }
            },
        };

        let deleted = self.store.delete_memory(id)?;
        if deleted {
            info!(memory_id = id, "deleted memory");
        }
        Ok(DeleteResult {
            success: deleted,
            memory_id: if deleted { Some(id) } else { None },
        })
    }

    /// Looks a memory up by id and, as a side effect, bumps its access
    /// count. `search_memory`'s internal hydration bypasses this and calls
    /// the store directly for exactly this reason — only an explicit
    /// `get_memory` counts as a use.
    pub fn get_memory(&self, id: i64) -> Result<Option<Memory>> {
        let memory = self.store.get_memory(id)?;
        if memory.is_some() {
            self.store.update_access_count(id)?;
        }
        Ok(memory)
    }
}

fn apply_post_filters(candidates: Vec<ScoredMemory>, filters: &MemoryFilters) -> Vec<ScoredMemory> {
    candidates
        .into_iter()
        .filter(|candidate| matches_filters(&candidate.memory, filters))
        .collect()
}

/// Mirrors the store-level filter semantics exactly (AND across filter
/// kinds, OR within the tag list) so post-filtering an already-hydrated
/// list never disagrees with `list_memories`'s SQL-side filtering.
fn matches_filters(memory: &Memory, filters: &MemoryFilters) -> bool {
    if let Some(priority) = filters.priority {
        if memory.priority != priority {
            return false;
        }
    }
    if let Some(project_id) = &filters.project_id {
        if memory.project_id.as_deref() != Some(project_id.as_str()) {
            return false;
        }
    }
    if !filters.tags.is_empty() && !filters.tags.iter().any(|tag| memory.tags.iter().any(|t| t == tag)) {
        return false;
    }
    if let Some(range) = &filters.date_range {
        if let Some(start) = range.start {
            if memory.created_at < start {
                return false;
            }
        }
        if let Some(end) = range.end {
            if memory.created_at > end {
                return false;
            }
        }
    }
    true
}

/// Builds a fully-wired service from a [`Config`]: opens (or creates) the
/// SQLite-backed store at `global_db_path`, constructs the embedding model
/// for the current feature set, and assembles the cache and scoring
/// weights from the config's `embedding`/`retrieval`/`deduplication`
/// sections.
pub fn build_service(config: &Config) -> Result<MemoryService> {
    let db_path = std::path::Path::new(&config.global_db_path);
    let store: Arc<dyn MemoryStore> = Arc::new(SqliteMemoryStore::open(db_path, config.embedding.dimension)?);
    let model: Arc<dyn EmbeddingModel> = build_model(config)?;

    Ok(MemoryService::new(
        store,
        model,
        config.embedding.cache_size,
        config.retrieval.scoring_weights.into(),
        config.retrieval.similarity_threshold,
        config.deduplication.auto_check,
        config.deduplication.similarity_threshold,
        config.retrieval.default_limit,
    ))
}

#[cfg(not(feature = "real-embeddings"))]
fn build_model(config: &Config) -> Result<Arc<dyn EmbeddingModel>> {
    use crate::embedding::StubEmbeddingModel;
    Ok(Arc::new(StubEmbeddingModel::new(config.embedding.dimension)))
}

#[cfg(feature = "real-embeddings")]
fn build_model(config: &Config) -> Result<Arc<dyn EmbeddingModel>> {
    use crate::embedding::CandleEmbeddingModel;
    use candle_core::Device;

    let device = match config.embedding.device.as_str() {
        "cuda" => Device::new_cuda(0).map_err(|e| MemoryError::ModelError(format!("cuda unavailable: {e}")))?,
        "mps" => Device::new_metal(0).map_err(|e| MemoryError::ModelError(format!("mps unavailable: {e}")))?,
        _ => Device::Cpu,
    };
    let model = CandleEmbeddingModel::load(&config.embedding.model, config.embedding.dimension, device)?;
    Ok(Arc::new(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::StubEmbeddingModel;
    use crate::models::{DateRange, MemoryFilters, Priority};
    use crate::store::SqliteMemoryStore;

    fn service_with_dimension(dimension: usize) -> MemoryService {
        let store: Arc<dyn MemoryStore> = Arc::new(SqliteMemoryStore::open_in_memory(dimension).unwrap());
        let model: Arc<dyn EmbeddingModel> = Arc::new(StubEmbeddingModel::new(dimension));
        MemoryService::new(store, model, 1000, ScoringWeights::default(), 0.0, true, 0.9, 10)
    }

    fn new_memory(content: &str) -> NewMemory {
        NewMemory {
            content: content.to_string(),
            tags: Vec::new(),
            priority: Priority::Normal,
            category: None,
            source: None,
            project_id: None,
            usage_contexts: Vec::new(),
        }
    }

    #[test]
    fn test_store_memory_rejects_empty_content() {
        let service = service_with_dimension(384);
        let err = service.store_memory(new_memory("   ")).unwrap_err();
        assert!(matches!(err, MemoryError::InvalidInput(_)));
    }

    #[test]
    fn test_store_memory_exact_duplicate_returns_same_id() {
        let service = service_with_dimension(384);
        let first = service.store_memory(new_memory("hello")).unwrap();
        assert!(!first.duplicate);

        let second = service.store_memory(new_memory("hello")).unwrap();
        assert!(second.duplicate);
        assert_eq!(first.memory_id, second.memory_id);
    }

    #[test]
    fn test_delete_then_restore_yields_new_id() {
        let service = service_with_dimension(384);
        let first = service.store_memory(new_memory("transient")).unwrap();

        let deleted = service.delete_memory(MemoryLocator::Id(first.memory_id)).unwrap();
        assert!(deleted.success);

        let second = service.store_memory(new_memory("transient")).unwrap();
        assert!(!second.duplicate);
        assert_ne!(first.memory_id, second.memory_id);
    }

    #[test]
    fn test_delete_by_unknown_hash_is_not_an_error() {
        let service = service_with_dimension(384);
        let result = service
            .delete_memory(MemoryLocator::ContentHash("deadbeef".repeat(8)))
            .unwrap();
        assert!(!result.success);
        assert!(result.memory_id.is_none());
    }

    #[test]
    fn test_get_memory_increments_access_count_but_search_does_not() {
        let service = service_with_dimension(384);
        let stored = service.store_memory(new_memory("auth jwt tokens")).unwrap();

        let fetched = service.get_memory(stored.memory_id).unwrap().unwrap();
        assert_eq!(fetched.access_count, 0);

        let _ = service
            .search_memory("auth jwt tokens", 5, &MemoryFilters::default())
            .unwrap();
        let after_search = service.get_memory(stored.memory_id).unwrap().unwrap();
        // get_memory itself just incremented it to 1; search must not have
        // touched it a second time.
        assert_eq!(after_search.access_count, 1);
    }

    #[test]
    fn test_search_memory_rejects_blank_query() {
        let service = service_with_dimension(384);
        let err = service
            .search_memory("   ", 5, &MemoryFilters::default())
            .unwrap_err();
        assert!(matches!(err, MemoryError::InvalidInput(_)));
    }

    #[test]
    fn test_search_memory_applies_priority_filter() {
        let service = service_with_dimension(384);
        let mut high = new_memory("database connection pooling");
        high.priority = Priority::High;
        service.store_memory(high).unwrap();

        let mut low = new_memory("database connection pooling variant");
        low.priority = Priority::Low;
        service.store_memory(low).unwrap();

        let filters = MemoryFilters {
            priority: Some(Priority::High),
            ..Default::default()
        };
        let results = service
            .search_memory("database connection pooling", 10, &filters)
            .unwrap();
        assert!(results.memories.iter().all(|m| m.memory.priority == Priority::High));
    }

    #[test]
    fn test_search_memory_date_range_filter_excludes_out_of_range() {
        let service = service_with_dimension(384);
        service.store_memory(new_memory("pagination sample")).unwrap();

        let filters = MemoryFilters {
            date_range: Some(DateRange {
                start: Some(Utc::now() + chrono::Duration::days(1)),
                end: None,
            }),
            ..Default::default()
        };
        let results = service.search_memory("pagination sample", 10, &filters).unwrap();
        assert!(results.memories.is_empty());
    }

    #[test]
    fn test_list_memories_has_more_and_pagination() {
        let service = service_with_dimension(384);
        for i in 0..15 {
            let mut memory = new_memory(&format!("paged memory {i}"));
            memory.tags = vec!["paging".to_string()];
            service.store_memory(memory).unwrap();
        }

        let filters = MemoryFilters {
            tags: vec!["paging".to_string()],
            ..Default::default()
        };
        let page1 = service
            .list_memories(&filters, SortColumn::CreatedAt, SortOrder::Asc, 10, 0)
            .unwrap();
        assert_eq!(page1.memories.len(), 10);
        assert!(page1.has_more);

        let page2 = service
            .list_memories(&filters, SortColumn::CreatedAt, SortOrder::Asc, 10, 10)
            .unwrap();
        assert_eq!(page2.memories.len(), 5);
        assert!(!page2.has_more);
    }
}
