//! Data model: the [`Memory`] row, its [`Priority`], and the structured
//! request/response types the service operations accept and return.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, Result};

/// The closed set of valid priority tokens. Ordering mirrors the scoring
/// weight assigned to each (`CORE` scores highest, `LOW` lowest); an unknown
/// token is never represented by this type and instead rejected at parse
/// time, or defaulted to `Normal` by the scorer when it encounters raw text
/// it doesn't own (see [`crate::scoring::priority_score`], which accepts a
/// `&str` rather than this enum for exactly that reason).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Core,
    High,
    Normal,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl Priority {
    /// The canonical uppercase token stored in the database and returned to
    /// callers, e.g. `"CORE"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Core => "CORE",
            Priority::High => "HIGH",
            Priority::Normal => "NORMAL",
            Priority::Low => "LOW",
        }
    }

    /// Parses a case-insensitive token into a [`Priority`], rejecting
    /// anything outside the closed set with [`MemoryError::InvalidPriority`].
    pub fn parse(token: &str) -> Result<Self> {
        match token.to_ascii_uppercase().as_str() {
            "CORE" => Ok(Priority::Core),
            "HIGH" => Ok(Priority::High),
            "NORMAL" => Ok(Priority::Normal),
            "LOW" => Ok(Priority::Low),
            other => Err(MemoryError::InvalidPriority(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single stored memory row, as persisted by [`crate::store`] and returned
/// by the five service operations. Mirrors the columns of the `memories`
/// table one for one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: i64,
    pub content: String,
    pub content_hash: String,
    pub priority: Priority,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub project_id: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub embedding_model: String,
    pub embedding_model_version: String,
    pub embedding_dimension: usize,
    pub access_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Passive, non-semantic annotations accumulated alongside a memory.
    /// Populated only at store time; no operation reads or mutates it later.
    pub usage_contexts: Vec<String>,
}

/// Caller-supplied fields for [`crate::service::MemoryService::store_memory`].
#[derive(Debug, Clone, Default)]
pub struct NewMemory {
    pub content: String,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub category: Option<String>,
    pub source: Option<String>,
    pub project_id: Option<String>,
    pub usage_contexts: Vec<String>,
}

/// Inclusive bounds on `created_at`. Either end may be omitted.
#[derive(Debug, Clone, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// The filter set recognised by `list_memories` and, post-hydration, by
/// `search_memory`. Unknown filters simply don't exist as fields here;
/// filters combine with AND, while `tags` combines internally with OR.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilters {
    pub priority: Option<Priority>,
    pub project_id: Option<String>,
    pub tags: Vec<String>,
    pub date_range: Option<DateRange>,
}

/// Sort order for `list_memories`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Columns `list_memories` is allowed to sort by. Validated against this
/// whitelist rather than accepting an arbitrary column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    CreatedAt,
    UpdatedAt,
    AccessCount,
    Priority,
}

impl SortColumn {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "created_at" => Ok(SortColumn::CreatedAt),
            "updated_at" => Ok(SortColumn::UpdatedAt),
            "access_count" => Ok(SortColumn::AccessCount),
            "priority" => Ok(SortColumn::Priority),
            other => Err(MemoryError::InvalidInput(format!(
                "unsupported sort column: {other}"
            ))),
        }
    }

    pub fn column_name(&self) -> &'static str {
        match self {
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
            SortColumn::AccessCount => "access_count",
            SortColumn::Priority => "priority",
        }
    }
}

/// A near-duplicate flagged (but not blocked) during `store_memory`.
#[derive(Debug, Clone, Serialize)]
pub struct NearDuplicate {
    pub memory_id: i64,
    pub similarity: f32,
    pub suggestion: String,
}

/// Output of `store_memory`.
#[derive(Debug, Clone, Serialize)]
pub struct StoreResult {
    pub success: bool,
    pub memory_id: i64,
    pub duplicate: bool,
    pub near_duplicate: Option<NearDuplicate>,
}

/// A memory augmented with its composite score and the per-factor breakdown
/// that produced it, as returned by `search_memory`.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredMemory {
    #[serde(flatten)]
    pub memory: Memory,
    pub score: f32,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreBreakdown {
    pub similarity: f32,
    pub recency: f32,
    pub priority: f32,
    pub usage: f32,
}

/// Output of `search_memory`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub success: bool,
    pub memories: Vec<ScoredMemory>,
    pub total: usize,
    pub limit: usize,
}

/// Output of `list_memories`.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub success: bool,
    pub memories: Vec<Memory>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Output of `delete_memory`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    pub success: bool,
    pub memory_id: Option<i64>,
}

/// The two mutually-exclusive ways to address a memory for deletion.
#[derive(Debug, Clone)]
pub enum MemoryLocator {
    Id(i64),
    ContentHash(String),
}
