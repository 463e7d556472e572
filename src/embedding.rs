//! Component B (model half): text → unit-norm vector of dimension `D`.
//!
//! Exactly two implementations of [`EmbeddingModel`] ship in this crate: a
//! deterministic, network-free [`StubEmbeddingModel`] compiled in by
//! default, and a transformer-backed [`CandleEmbeddingModel`] gated behind
//! the `real-embeddings` feature. The service and store never know which one
//! they're talking to.

use rayon::prelude::*;

use crate::error::{MemoryError, Result};

/// Name and version of the model that produced an embedding, persisted on
/// each memory row as provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
}

/// The capability contract of the embedding pipeline's model half. A narrow
/// interface so tests can run entirely against the deterministic stub.
pub trait EmbeddingModel: Send + Sync {
    /// Embeds non-empty `text` into a unit-norm vector of length
    /// [`dimension`](Self::dimension). Fails with `InvalidInput` on empty
    /// (post-trim) text, `ModelError` on any other failure.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch of texts. Empty entries yield an all-zero vector of
    /// length `D` at their original position and do not fail the batch; a
    /// batch that is entirely empty fails with `ModelError`.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;

    fn model_info(&self) -> ModelInfo;
}

fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
    vector
}

/// Deterministically derives a unit vector from the SHA-256 digest of the
/// input text. Two calls with the same text always produce the same vector
/// (so the LRU cache and exact-duplicate detection behave predictably in
/// tests), and unrelated texts land far apart in the embedding space with
/// overwhelming probability, which is enough to exercise ranking and
/// near-duplicate logic without downloading real model weights.
#[derive(Debug, Default)]
pub struct StubEmbeddingModel {
    dimension: usize,
}

impl StubEmbeddingModel {
    pub fn new(dimension: usize) -> Self {
        StubEmbeddingModel { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let digest = sha256::digest(text);
        let digest_bytes = digest.as_bytes();
        let mut vector = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            let byte = digest_bytes[i % digest_bytes.len()];
            // Spread byte values (0..=255, ASCII hex digits really) into a
            // signed range so the resulting vector isn't all-positive.
            vector.push((byte as f32) - 128.0);
        }
        l2_normalize(vector)
    }
}

impl EmbeddingModel for StubEmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(MemoryError::InvalidInput("cannot embed empty text".to_string()));
        }
        Ok(self.embed_one(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.iter().all(|t| t.trim().is_empty()) {
            return Err(MemoryError::ModelError("batch contains no non-empty text".to_string()));
        }
        Ok(texts
            .par_iter()
            .map(|text| {
                if text.trim().is_empty() {
                    vec![0.0f32; self.dimension]
                } else {
                    self.embed_one(text)
                }
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            name: "stub-sha256".to_string(),
            version: "1".to_string(),
        }
    }
}

#[cfg(feature = "real-embeddings")]
pub use real::CandleEmbeddingModel;

#[cfg(feature = "real-embeddings")]
mod real {
    use std::path::PathBuf;

    use candle_core::{DType, Device, Tensor};
    use candle_nn::VarBuilder;
    use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
    use hf_hub::api::tokio::Api;
    use tokenizers::{PaddingParams, Tokenizer};

    use super::{l2_normalize, EmbeddingModel, ModelInfo};
    use crate::error::{MemoryError, Result};

    /// Sentence-embedding model (all-MiniLM-L6-v2 by default): mean-pooled,
    /// L2-normalised BERT hidden states. Weights are fetched from the
    /// Hugging Face Hub on first use and cached locally by `hf-hub`.
    pub struct CandleEmbeddingModel {
        model: BertModel,
        tokenizer: Tokenizer,
        device: Device,
        dimension: usize,
        model_name: String,
    }

    impl CandleEmbeddingModel {
        /// Downloads (or reuses a cached copy of) the named model's weights
        /// and tokenizer, and loads them onto `device`.
        pub fn load(model_name: &str, dimension: usize, device: Device) -> Result<Self> {
            let runtime = tokio::runtime::Runtime::new()
                .map_err(|e| MemoryError::ModelError(format!("cannot start download runtime: {e}")))?;
            let (config_path, tokenizer_path, weights_path) = runtime.block_on(Self::fetch(model_name))?;

            let config_json = std::fs::read_to_string(&config_path)
                .map_err(|e| MemoryError::ModelError(format!("reading model config: {e}")))?;
            let config: BertConfig = serde_json::from_str(&config_json)
                .map_err(|e| MemoryError::ModelError(format!("parsing model config: {e}")))?;

            let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| MemoryError::ModelError(format!("loading tokenizer: {e}")))?;
            tokenizer.with_padding(Some(PaddingParams::default()));

            let vb = unsafe {
                VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)
                    .map_err(|e| MemoryError::ModelError(format!("loading model weights: {e}")))?
            };
            let model = BertModel::load(vb, &config)
                .map_err(|e| MemoryError::ModelError(format!("constructing model: {e}")))?;

            Ok(CandleEmbeddingModel {
                model,
                tokenizer,
                device,
                dimension,
                model_name: model_name.to_string(),
            })
        }

        async fn fetch(model_name: &str) -> Result<(PathBuf, PathBuf, PathBuf)> {
            let api = Api::new().map_err(|e| MemoryError::ModelError(format!("hf-hub api: {e}")))?;
            let repo = api.model(model_name.to_string());
            let config = repo
                .get("config.json")
                .await
                .map_err(|e| MemoryError::ModelError(format!("fetching config.json: {e}")))?;
            let tokenizer = repo
                .get("tokenizer.json")
                .await
                .map_err(|e| MemoryError::ModelError(format!("fetching tokenizer.json: {e}")))?;
            let weights = repo
                .get("model.safetensors")
                .await
                .map_err(|e| MemoryError::ModelError(format!("fetching model.safetensors: {e}")))?;
            Ok((config, tokenizer, weights))
        }

        fn encode(&self, text: &str) -> Result<Vec<f32>> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| MemoryError::ModelError(format!("tokenizing: {e}")))?;
            let ids = Tensor::new(encoding.get_ids(), &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| MemoryError::ModelError(e.to_string()))?;
            let type_ids = Tensor::new(encoding.get_type_ids(), &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| MemoryError::ModelError(e.to_string()))?;

            let hidden = self
                .model
                .forward(&ids, &type_ids, None)
                .map_err(|e| MemoryError::ModelError(format!("forward pass: {e}")))?;

            // Mean pooling over the sequence dimension.
            let (_, seq_len, _) = hidden
                .dims3()
                .map_err(|e| MemoryError::ModelError(e.to_string()))?;
            let pooled = (hidden.sum(1).map_err(|e| MemoryError::ModelError(e.to_string()))? / (seq_len as f64))
                .map_err(|e| MemoryError::ModelError(e.to_string()))?;
            let vector: Vec<f32> = pooled
                .squeeze(0)
                .and_then(|t| t.to_vec1())
                .map_err(|e| MemoryError::ModelError(e.to_string()))?;
            Ok(l2_normalize(vector))
        }
    }

    impl EmbeddingModel for CandleEmbeddingModel {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.trim().is_empty() {
                return Err(MemoryError::InvalidInput("cannot embed empty text".to_string()));
            }
            self.encode(text)
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.iter().all(|t| t.trim().is_empty()) {
                return Err(MemoryError::ModelError("batch contains no non-empty text".to_string()));
            }
            texts
                .iter()
                .map(|text| {
                    if text.trim().is_empty() {
                        Ok(vec![0.0f32; self.dimension])
                    } else {
                        self.encode(text)
                    }
                })
                .collect()
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn model_info(&self) -> ModelInfo {
            ModelInfo {
                name: self.model_name.clone(),
                version: "candle".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_rejects_empty_input() {
        let model = StubEmbeddingModel::new(8);
        let err = model.embed("   ").unwrap_err();
        assert!(matches!(err, MemoryError::InvalidInput(_)));
    }

    #[test]
    fn test_embed_is_deterministic_and_unit_norm() {
        let model = StubEmbeddingModel::new(384);
        let a = model.embed("hello world").unwrap();
        let b = model.embed("hello world").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_embed_distinguishes_different_text() {
        let model = StubEmbeddingModel::new(384);
        let a = model.embed("alpha").unwrap();
        let b = model.embed("beta").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_embed_batch_handles_empty_entries_without_failing() {
        let model = StubEmbeddingModel::new(16);
        let texts = vec!["hello".to_string(), "".to_string(), "world".to_string()];
        let vectors = model.embed_batch(&texts).unwrap();
        assert_eq!(vectors.len(), 3);
        assert!(vectors[1].iter().all(|x| *x == 0.0));
        assert!(vectors[0].iter().any(|x| *x != 0.0));
    }

    #[test]
    fn test_embed_batch_all_empty_fails() {
        let model = StubEmbeddingModel::new(16);
        let texts = vec!["".to_string(), "   ".to_string()];
        let err = model.embed_batch(&texts).unwrap_err();
        assert!(matches!(err, MemoryError::ModelError(_)));
    }
}
