//! Top-K context retrieval for a question.

use crate::rag::index::TextIndex;
use crate::types::{AppError, Result};
use std::sync::Arc;

/// Default number of documents retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Retrieved document bodies for one request, most similar first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    pub documents: Vec<String>,
}

impl QueryContext {
    pub fn new(documents: Vec<String>) -> Self {
        Self { documents }
    }

    /// Bodies joined by a blank line; empty when nothing was retrieved.
    pub fn render(&self) -> String {
        self.documents.join("\n\n")
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[derive(Clone)]
pub struct ContextRetriever {
    index: Arc<dyn TextIndex>,
}

impl ContextRetriever {
    pub fn new(index: Arc<dyn TextIndex>) -> Self {
        Self { index }
    }

    /// Retrieve up to `k` documents relevant to `question`.
    ///
    /// An index with fewer than `k` documents, or none at all, yields a
    /// shorter (possibly empty) context rather than an error.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<QueryContext> {
        if k == 0 {
            return Ok(QueryContext::default());
        }

        let results = match self.index.query(question, k).await {
            Ok(results) => results,
            Err(AppError::NotFound(detail)) => {
                tracing::warn!("Index unavailable, continuing without context: {}", detail);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        tracing::debug!("Retrieved {} context documents (k = {})", results.len(), k);

        Ok(QueryContext::new(
            results
                .into_iter()
                .take(k)
                .map(|result| result.document.content)
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Document, SearchResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedIndex {
        results: Vec<SearchResult>,
        calls: AtomicUsize,
    }

    impl FixedIndex {
        fn new(bodies: &[&str]) -> Self {
            Self {
                results: bodies
                    .iter()
                    .enumerate()
                    .map(|(i, body)| SearchResult {
                        document: Document::new(format!("doc{}", i), *body),
                        score: 1.0 - i as f32 * 0.1,
                    })
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextIndex for FixedIndex {
        async fn query(&self, _text: &str, k: usize) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.iter().take(k).cloned().collect())
        }
    }

    struct MissingIndex;

    #[async_trait]
    impl TextIndex for MissingIndex {
        async fn query(&self, _text: &str, _k: usize) -> Result<Vec<SearchResult>> {
            Err(AppError::NotFound("Collection 'banking_docs' not found".to_string()))
        }
    }

    struct BrokenIndex;

    #[async_trait]
    impl TextIndex for BrokenIndex {
        async fn query(&self, _text: &str, _k: usize) -> Result<Vec<SearchResult>> {
            Err(AppError::Embedding("model unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_retrieve_keeps_order_and_renders() {
        let index = FixedIndex::new(&["first", "second", "third", "fourth"]);
        let retriever = ContextRetriever::new(Arc::new(index));
        let context = retriever.retrieve("q", 3).await.unwrap();

        assert_eq!(context.documents, vec!["first", "second", "third"]);
        assert_eq!(context.render(), "first\n\nsecond\n\nthird");
    }

    #[tokio::test]
    async fn test_retrieve_small_index() {
        let retriever = ContextRetriever::new(Arc::new(FixedIndex::new(&["only"])));
        let context = retriever.retrieve("q", DEFAULT_TOP_K).await.unwrap();

        assert_eq!(context.len(), 1);
        assert_eq!(context.render(), "only");
    }

    #[tokio::test]
    async fn test_retrieve_zero_k_skips_query() {
        let index = Arc::new(FixedIndex::new(&["a"]));
        let retriever = ContextRetriever::new(index.clone());

        let context = retriever.retrieve("q", 0).await.unwrap();
        assert!(context.is_empty());
        assert_eq!(context.render(), "");
        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty_context() {
        let retriever = ContextRetriever::new(Arc::new(MissingIndex));
        assert!(retriever.retrieve("q", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_index_failure_propagates() {
        let retriever = ContextRetriever::new(Arc::new(BrokenIndex));
        assert!(matches!(
            retriever.retrieve("q", 3).await,
            Err(AppError::Embedding(_))
        ));
    }
}
