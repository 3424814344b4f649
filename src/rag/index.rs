//! Document index: an [`Embedder`] and a [`VectorStore`] collection used together.

use crate::db::vectorstore::VectorStore;
use crate::rag::embeddings::{embedder_from_config, Embedder};
use crate::types::{AppError, Document, Result, SearchResult};
use crate::utils::toml_config::RagConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Query side of a vector index, as seen by the retriever.
#[async_trait]
pub trait TextIndex: Send + Sync {
    /// The `k` nearest documents to `text`, most similar first.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchResult>>;
}

pub struct DocumentIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
}

impl DocumentIndex {
    /// Open `collection` in `store`, creating it if it does not exist.
    pub async fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
    ) -> Result<Self> {
        let collection = collection.into();

        if !store.collection_exists(&collection).await? {
            store
                .create_collection(&collection, embedder.dimensions())
                .await?;
            tracing::info!(
                "Created collection '{}' ({} dims, {})",
                collection,
                embedder.dimensions(),
                store.provider_name()
            );
        }

        Ok(Self {
            store,
            embedder,
            collection,
        })
    }

    /// Open the configured collection with the configured embedder.
    pub async fn from_config(config: &RagConfig, store: Arc<dyn VectorStore>) -> Result<Self> {
        let embedder = embedder_from_config(config)?;
        Self::new(store, embedder, config.collection.clone()).await
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Embed and store documents. Existing ids are replaced.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let embedded: Vec<Document> = documents
            .into_iter()
            .zip(embeddings)
            .map(|(doc, embedding)| Document {
                embedding: Some(embedding),
                ..doc
            })
            .collect();

        let added = self.store.upsert(&self.collection, &embedded).await?;
        tracing::debug!("Indexed {} documents into '{}'", added, self.collection);
        Ok(added)
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.count(&self.collection).await
    }
}

#[async_trait]
impl TextIndex for DocumentIndex {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchResult>> {
        let embedding = self
            .embedder
            .embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("No embedding returned for query".to_string()))?;

        // Nearest neighbours only; no similarity cut-off.
        self.store
            .search(&self.collection, &embedding, k, f32::MIN)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::vectorstore::InMemoryVectorStore;
    use crate::rag::embeddings::HashingEmbedder;

    async fn index() -> DocumentIndex {
        DocumentIndex::new(
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(HashingEmbedder::default()),
            "banking_docs",
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_new_creates_collection_once() {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::default());

        DocumentIndex::new(store.clone(), embedder.clone(), "docs")
            .await
            .unwrap();
        let reopened = DocumentIndex::new(store.clone(), embedder, "docs").await;

        assert!(reopened.is_ok());
        assert!(store.collection_exists("docs").await.unwrap());
    }

    #[tokio::test]
    async fn test_query_ranks_by_similarity() {
        let index = index().await;
        index
            .add_documents(vec![
                Document::new("balance", "Check your account balance in the mobile app."),
                Document::new("loans", "Personal loans have fixed interest rates."),
                Document::new("cards", "Report a lost card immediately."),
            ])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 3);

        let results = index.query("How do I see my account balance?", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.id, "balance");
    }

    #[cfg(not(feature = "local-embeddings"))]
    #[tokio::test]
    async fn test_from_config_uses_configured_collection() {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
        let index = DocumentIndex::from_config(&RagConfig::default(), store.clone())
            .await
            .unwrap();

        assert_eq!(index.collection(), "banking_docs");
        assert!(store.collection_exists("banking_docs").await.unwrap());
    }

    #[tokio::test]
    async fn test_query_empty_index() {
        let index = index().await;
        assert!(index.query("anything", 3).await.unwrap().is_empty());
        assert_eq!(index.add_documents(Vec::new()).await.unwrap(), 0);
    }
}
