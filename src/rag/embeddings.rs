//! Dense embeddings for documents and questions.
//!
//! The same [`Embedder`] must be used for ingestion and querying so that
//! vectors live in one space. Two implementations ship:
//!
//! - [`HashingEmbedder`] - deterministic bag-of-words feature hashing, no model
//!   download, used by default and in tests
//! - [`EmbeddingService`] - `all-MiniLM-L6-v2` through fastembed (feature
//!   `local-embeddings`)

use crate::types::{AppError, Result};
use crate::utils::toml_config::RagConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Embedding model abstraction.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;

    /// Dimensionality of the produced vectors.
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, one vector per input in the same order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

// ============= Feature Hashing =============

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub const DEFAULT_HASHING_DIMENSIONS: usize = 256;

/// Deterministic bag-of-words embedder.
///
/// Lower-cased alphanumeric tokens are hashed (FNV-1a) into a fixed number of
/// buckets and the resulting count vector is L2-normalized. Texts that share
/// words score a positive cosine similarity; texts with no tokens map to the
/// zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(AppError::Embedding(
                "Hashing embedder needs at least one dimension".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (fnv1a(&token.to_lowercase()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_HASHING_DIMENSIONS,
        }
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        "feature-hashing"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

/// Embedder selected by the `[rag]` configuration.
///
/// Without the `local-embeddings` feature the configured model cannot be
/// loaded and the hashing embedder is used instead.
pub fn embedder_from_config(config: &RagConfig) -> Result<Arc<dyn Embedder>> {
    #[cfg(feature = "local-embeddings")]
    {
        Ok(Arc::new(EmbeddingService::new(&config.embedding_model)?))
    }

    #[cfg(not(feature = "local-embeddings"))]
    {
        tracing::warn!(
            "`local-embeddings` disabled; using feature hashing instead of {}",
            config.embedding_model
        );
        Ok(Arc::new(HashingEmbedder::default()))
    }
}

// ============= fastembed =============

#[cfg(feature = "local-embeddings")]
pub use local::EmbeddingService;

#[cfg(feature = "local-embeddings")]
mod local {
    use super::Embedder;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Sentence-transformer embeddings computed locally with fastembed.
    pub struct EmbeddingService {
        model: Arc<Mutex<TextEmbedding>>,
        model_name: String,
        dimensions: usize,
    }

    impl EmbeddingService {
        /// Load a model by its short name. The model is downloaded on first use.
        pub fn new(model_name: &str) -> Result<Self> {
            let (model, dimensions) = match model_name {
                "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
                    (EmbeddingModel::AllMiniLML6V2, 384)
                }
                "bge-small-en-v1.5" | "BAAI/bge-small-en-v1.5" => {
                    (EmbeddingModel::BGESmallENV15, 384)
                }
                other => {
                    return Err(AppError::Configuration(format!(
                        "Unsupported embedding model '{}'",
                        other
                    )))
                }
            };

            let embedding = TextEmbedding::try_new(
                InitOptions::new(model).with_show_download_progress(true),
            )
            .map_err(|e| AppError::Embedding(e.to_string()))?;

            tracing::info!("Loaded embedding model {} ({} dims)", model_name, dimensions);

            Ok(Self {
                model: Arc::new(Mutex::new(embedding)),
                model_name: model_name.to_string(),
                dimensions,
            })
        }
    }

    #[async_trait]
    impl Embedder for EmbeddingService {
        fn model_name(&self) -> &str {
            &self.model_name
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let model = Arc::clone(&self.model);
            let texts = texts.to_vec();

            tokio::task::spawn_blocking(move || {
                model
                    .lock()
                    .embed(texts, None)
                    .map_err(|e| AppError::Embedding(e.to_string()))
            })
            .await
            .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))?
        }
    }
}
