//! Configuration loading for the memory store.
//!
//! Configuration is a plain YAML file deserialized into [`Config`], an
//! explicitly-constructed value — there is no process-wide settings
//! singleton and no environment-variable layering. Re-configuring a running
//! binary means loading a new [`Config`] and building a new
//! [`crate::service::MemoryService`] from it; nothing here is mutated in
//! place after load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MemoryError, Result};
use crate::scoring::ScoringWeights;

/// `embedding.*` — shapes the pipeline built by [`crate::service::build_service`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model name for the pipeline. Only consulted when the crate is built
    /// with the `real-embeddings` feature; the default stub model ignores
    /// it and always reports `"stub-sha256"`.
    pub model: String,
    /// Vector length `D`. Every vector the store holds must have this many
    /// components; changing it after memories exist makes them unreadable
    /// by a fresh [`crate::store::SqliteMemoryStore`] (dimensions aren't
    /// migrated).
    pub dimension: usize,
    /// `cpu` | `cuda` | `mps`. Only meaningful under `real-embeddings`.
    pub device: String,
    /// Capacity `N` of the content-hash-keyed embedding LRU cache.
    pub cache_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig {
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimension: 384,
            device: "cpu".to_string(),
            cache_size: 1000,
        }
    }
}

/// `retrieval.*` — search defaults and the weights handed to [`crate::scoring::rank`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_limit: usize,
    /// τ_sim: minimum similarity a search candidate must clear to be considered.
    pub similarity_threshold: f32,
    pub scoring_weights: ScoringWeightsConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        RetrievalConfig {
            default_limit: 10,
            similarity_threshold: 0.7,
            scoring_weights: ScoringWeightsConfig::default(),
        }
    }
}

/// YAML-friendly mirror of [`ScoringWeights`] (which has no `Serialize`
/// derive of its own since it's a pure scoring-component type, not a wire
/// type).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringWeightsConfig {
    pub similarity: f32,
    pub recency: f32,
    pub priority: f32,
    pub usage: f32,
}

impl Default for ScoringWeightsConfig {
    fn default() -> Self {
        let defaults = ScoringWeights::default();
        ScoringWeightsConfig {
            similarity: defaults.similarity,
            recency: defaults.recency,
            priority: defaults.priority,
            usage: defaults.usage,
        }
    }
}

impl From<ScoringWeightsConfig> for ScoringWeights {
    fn from(cfg: ScoringWeightsConfig) -> Self {
        ScoringWeights {
            similarity: cfg.similarity,
            recency: cfg.recency,
            priority: cfg.priority,
            usage: cfg.usage,
        }
    }
}

/// `deduplication.*` — governs the near-duplicate probe inside `store_memory`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeduplicationConfig {
    pub auto_check: bool,
    /// τ_dup: minimum similarity to flag (not block) a near-duplicate on store.
    pub similarity_threshold: f32,
}

impl Default for DeduplicationConfig {
    fn default() -> Self {
        DeduplicationConfig {
            auto_check: true,
            similarity_threshold: 0.9,
        }
    }
}

/// Top-level configuration record. All keys are optional in the YAML file —
/// anything omitted falls back to the corresponding `Default` impl.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database file. Empty string means "not set";
    /// [`load_config`] fills in the platform default at load time.
    pub global_db_path: String,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub deduplication: DeduplicationConfig,
    /// `DEBUG` | `INFO` | `WARNING` | `ERROR`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            global_db_path: String::new(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            deduplication: DeduplicationConfig::default(),
            log_level: "INFO".to_string(),
        }
    }
}

/// Default location for the database file: `<home>/.memory/db`.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memory")
        .join("db")
}

/// Default location for the config file: `<home>/.memory/config.yaml`.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memory")
        .join("config.yaml")
}

/// Reads and validates a YAML config file at `path`. Missing
/// `global_db_path` is normalized to [`default_db_path`] (warning logged);
/// everything else deserializes straight through `serde`'s field defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| MemoryError::StorageUnavailable(format!("reading config {}: {e}", path.display())))?;
    let mut config: Config = serde_yaml::from_str(&content)
        .map_err(|e| MemoryError::Internal(format!("parsing config {}: {e}", path.display())))?;

    if config.global_db_path.trim().is_empty() {
        let default_path = default_db_path();
        warn!(path = %default_path.display(), "global_db_path unset, using default");
        config.global_db_path = default_path.to_string_lossy().to_string();
    }
    validate(&config)?;
    Ok(config)
}

/// Basic sanity checks that don't belong in `serde`'s deserialization path:
/// a zero dimension or a non-positive default limit would make every
/// downstream operation fail in confusing ways, so reject them up front.
fn validate(config: &Config) -> Result<()> {
    if config.embedding.dimension == 0 {
        return Err(MemoryError::InvalidInput("embedding.dimension must be > 0".to_string()));
    }
    if config.retrieval.default_limit == 0 {
        return Err(MemoryError::InvalidInput("retrieval.default_limit must be > 0".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_config_fills_in_default_db_path_when_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "log_level: DEBUG\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.log_level, "DEBUG");
        assert!(!config.global_db_path.is_empty());
    }

    #[test]
    fn test_load_config_rejects_zero_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "embedding:\n  dimension: 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, MemoryError::InvalidInput(_)));
    }

    #[test]
    fn test_load_config_missing_file_is_storage_unavailable() {
        let err = load_config(Path::new("/nonexistent/path/config.yaml")).unwrap_err();
        assert!(matches!(err, MemoryError::StorageUnavailable(_)));
    }
}
