//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface over the text-generation backends:
//! - **Gemini**: Google Generative Language API, whole-response and streaming
//! - **Ollama**: Local LLM inference with streaming (feature `ollama`)

use crate::types::Result;
use async_trait::async_trait;

/// Boxed stream of generated text chunks, as produced by a backend.
pub type TextStream = Box<dyn futures::Stream<Item = Result<String>> + Send + Unpin>;

/// Generic LLM client trait for provider abstraction
///
/// All generation backends implement this trait, allowing the pipeline to
/// swap providers (or test fakes) without changing orchestration code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Stream a completion. Chunks arrive in order; the stream ends when the
    /// backend signals completion.
    async fn stream(&self, prompt: &str) -> Result<TextStream>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// | Provider | Streaming | Credential |
/// |----------|-----------|------------|
/// | Gemini   | ✅ (SSE)  | API key    |
/// | Ollama   | ✅ (NDJSON) | none     |
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini via the Generative Language REST API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Gemini {
    ///     api_key: std::env::var("GEMINI_API_KEY")?,
    ///     api_base: "https://generativelanguage.googleapis.com".to_string(),
    ///     model: "gemini-1.5-flash".to_string(),
    /// };
    /// ```
    Gemini {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    #[cfg(feature = "ollama")]
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            Provider::Gemini {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::gemini::GeminiClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            )?)),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone()).await?,
            )),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "Gemini",
            #[cfg(feature = "ollama")]
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::Gemini { model, .. } => model,
            #[cfg(feature = "ollama")]
            Provider::Ollama { model, .. } => model,
        }
    }
}
