//! Mock implementations for testing.
//!
//! Scripted generation clients and fixed indexes shared by the integration
//! tests, so the pipeline can be exercised without a network or a model.

use async_trait::async_trait;
use futures::stream;
use ocean::llm::{LLMClient, TextStream};
use ocean::rag::TextIndex;
use ocean::types::{AppError, Document, Result, SearchResult};
use parking_lot::Mutex;
use std::sync::Arc;

/// Mock LLM client with scripted output.
///
/// Every prompt it receives is recorded, so tests can assert on prompt layout.
///
/// ```ignore
/// let client = MockLLMClient::new("Your balance is $1,000.");
/// let client = MockLLMClient::chunked(&["Your ", "balance"]);
/// let client = MockLLMClient::failing();
/// ```
#[derive(Clone)]
pub struct MockLLMClient {
    chunks: Vec<String>,
    should_fail: bool,
    fail_after: Option<usize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    /// Returns `response` whole, and streams it as a single chunk.
    pub fn new(response: &str) -> Self {
        Self::chunked(&[response])
    }

    /// Streams the given chunks; `generate` returns them concatenated.
    pub fn chunked(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            should_fail: false,
            fail_after: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every call before producing output.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::chunked(&[])
        }
    }

    /// Streams the first `count` chunks, then an error.
    pub fn failing_after(chunks: &[&str], count: usize) -> Self {
        Self {
            fail_after: Some(count),
            ..Self::chunked(chunks)
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn record(&self, prompt: &str) {
        self.prompts.lock().push(prompt.to_string());
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.record(prompt);
        if self.should_fail || self.fail_after.is_some() {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.chunks.concat())
    }

    async fn stream(&self, prompt: &str) -> Result<TextStream> {
        self.record(prompt);
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }

        let mut items: Vec<Result<String>> = match self.fail_after {
            Some(count) => self.chunks.iter().take(count).cloned().map(Ok).collect(),
            None => self.chunks.iter().cloned().map(Ok).collect(),
        };
        if self.fail_after.is_some() {
            items.push(Err(AppError::LLM("Mock stream interrupted".to_string())));
            // Anything after the error must not be delivered.
            items.push(Ok("unreachable".to_string()));
        }

        Ok(Box::new(stream::iter(items)))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Index returning fixed documents in the given order.
pub struct StaticIndex {
    bodies: Vec<String>,
}

impl StaticIndex {
    pub fn new(bodies: &[&str]) -> Self {
        Self {
            bodies: bodies.iter().map(|b| b.to_string()).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }
}

#[async_trait]
impl TextIndex for StaticIndex {
    async fn query(&self, _text: &str, k: usize) -> Result<Vec<SearchResult>> {
        Ok(self
            .bodies
            .iter()
            .take(k)
            .enumerate()
            .map(|(i, body)| SearchResult {
                document: Document::new(format!("doc_{}", i + 1), body.clone()),
                score: 1.0 - i as f32 * 0.1,
            })
            .collect())
    }
}

/// Index whose every query fails.
pub struct FailingIndex;

#[async_trait]
impl TextIndex for FailingIndex {
    async fn query(&self, _text: &str, _k: usize) -> Result<Vec<SearchResult>> {
        Err(AppError::Embedding("Mock embedding failure".to_string()))
    }
}
