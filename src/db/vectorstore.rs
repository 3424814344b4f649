//! Vector Store Abstraction Layer
//!
//! This module provides the interface the document index uses to keep embedded
//! documents in named collections and to run nearest-neighbour queries against
//! them.
//!
//! # Example
//!
//! ```rust,ignore
//! use ocean::db::vectorstore::{InMemoryVectorStore, VectorStore};
//!
//! let store = InMemoryVectorStore::new();
//! store.create_collection("banking_docs", 384).await?;
//! store.upsert("banking_docs", &documents).await?;
//!
//! let results = store.search("banking_docs", &query_embedding, 3, 0.0).await?;
//! ```

use crate::types::{AppError, Document, Result, SearchResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Vector Store Trait
// ============================================================================

/// Abstract trait for vector database operations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the name of this vector store provider.
    fn provider_name(&self) -> &'static str;

    /// Create a new collection with the specified vector dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Check if a collection exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Upsert documents with their embeddings into a collection.
    ///
    /// Documents are identified by their `id` field. If a document with
    /// the same ID already exists, it will be updated.
    ///
    /// # Errors
    ///
    /// Returns an error if any document is missing an embedding, or its
    /// embedding does not match the collection's dimensions.
    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize>;

    /// Search for similar vectors in a collection.
    ///
    /// # Returns
    ///
    /// At most `limit` results scoring at least `threshold`, sorted by
    /// similarity score (descending).
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Delete documents by their IDs, returning how many were removed.
    async fn delete(&self, collection: &str, ids: &[String]) -> Result<usize>;

    /// Get a document by ID.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Count documents in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;
}

// ============================================================================
// In-Memory Vector Store
// ============================================================================

/// In-memory vector store.
///
/// Data is not persisted and will be lost when the process exits.
/// Uses cosine similarity for vector comparisons.
pub struct InMemoryVectorStore {
    collections: Arc<RwLock<HashMap<String, InMemoryCollection>>>,
}

struct InMemoryCollection {
    dimensions: usize,
    documents: HashMap<String, Document>,
}

impl InMemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Calculate cosine similarity between two vectors.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }

    fn missing(collection: &str) -> AppError {
        AppError::NotFound(format!("Collection '{}' not found", collection))
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            return Err(AppError::VectorStore(format!(
                "Collection '{}' already exists",
                name
            )));
        }
        collections.insert(
            name.to_string(),
            InMemoryCollection {
                dimensions,
                documents: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collections.read().contains_key(name))
    }

    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| Self::missing(collection))?;

        for doc in documents {
            match &doc.embedding {
                None => {
                    return Err(AppError::InvalidInput(format!(
                        "Document '{}' is missing embedding",
                        doc.id
                    )))
                }
                Some(embedding) if embedding.len() != col.dimensions => {
                    return Err(AppError::VectorStore(format!(
                        "Document '{}' has {} dimensions, collection '{}' expects {}",
                        doc.id,
                        embedding.len(),
                        collection,
                        col.dimensions
                    )))
                }
                Some(_) => {}
            }
        }

        for doc in documents {
            col.documents.insert(doc.id.clone(), doc.clone());
        }

        Ok(documents.len())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| Self::missing(collection))?;

        let mut results: Vec<SearchResult> = col
            .documents
            .values()
            .filter_map(|doc| {
                let doc_embedding = doc.embedding.as_ref()?;
                let score = Self::cosine_similarity(embedding, doc_embedding);
                (score >= threshold).then(|| SearchResult {
                    document: Document::new(doc.id.clone(), doc.content.clone()),
                    score,
                })
            })
            .collect();

        // Ties broken by id so results are stable across runs
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<usize> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| Self::missing(collection))?;

        Ok(ids
            .iter()
            .filter(|id| col.documents.remove(*id).is_some())
            .count())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| Self::missing(collection))?;

        Ok(col.documents.get(id).cloned())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read();
        collections
            .get(collection)
            .map(|col| col.documents.len())
            .ok_or_else(|| Self::missing(collection))
    }
}

// ============================================================================
// Tests
// ============================================================================
