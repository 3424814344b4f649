//! Generation Client Adapter
//!
//! Wraps an optional [`LLMClient`]. With a client configured, calls go to the
//! backend; without one the adapter is in *mock mode* and answers with a fixed
//! greeting, streamed word by word with a short pause, so the chat surface can
//! be developed without credentials.
//!
//! Backend failures never panic: [`GenerationAdapter::generate`] reports them as
//! `Err`, and [`GenerationAdapter::generate_stream`] as a final `Err` item.

use crate::llm::client::{LLMClient, Provider};
use crate::types::{AppError, Result};
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Fixed reply used in mock mode.
pub const MOCK_GREETING: &str = "Hello! I'm your Ocean Bank assistant. How can I help you today? \
     I can assist you with account information, loans, and general banking questions.";

/// Default pause between mock words.
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(50);

/// Owned stream of generated fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Where generated text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationSource {
    Backend,
    Mock,
}

/// A whole-response generation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub source: GenerationSource,
}

#[derive(Clone)]
pub struct GenerationAdapter {
    client: Option<Arc<dyn LLMClient>>,
    mock_delay: Duration,
}

impl GenerationAdapter {
    /// Adapter backed by a live client.
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client: Some(client),
            mock_delay: DEFAULT_MOCK_DELAY,
        }
    }

    /// Adapter in mock mode.
    pub fn mock() -> Self {
        Self {
            client: None,
            mock_delay: DEFAULT_MOCK_DELAY,
        }
    }

    /// Build from a resolved provider; `None` selects mock mode.
    pub async fn from_provider(provider: Option<&Provider>) -> Result<Self> {
        match provider {
            Some(provider) => {
                let client = provider.create_client().await?;
                tracing::info!(
                    "{} generation backend initialized (model: {})",
                    provider.name(),
                    client.model_name()
                );
                Ok(Self::new(Arc::from(client)))
            }
            None => Ok(Self::mock()),
        }
    }

    pub fn with_mock_delay(mut self, delay: Duration) -> Self {
        self.mock_delay = delay;
        self
    }

    pub fn is_mock(&self) -> bool {
        self.client.is_none()
    }

    pub fn model_name(&self) -> &str {
        self.client
            .as_deref()
            .map(|client| client.model_name())
            .unwrap_or("mock")
    }

    /// Generate a whole response.
    pub async fn generate(&self, prompt: &str) -> Result<Generation> {
        let Some(client) = &self.client else {
            return Ok(Generation {
                text: MOCK_GREETING.split_whitespace().collect::<Vec<_>>().join(" "),
                source: GenerationSource::Mock,
            });
        };

        let text = client.generate(prompt).await.map_err(|e| {
            tracing::error!("Generation failed: {}", e);
            e
        })?;

        Ok(Generation {
            text,
            source: GenerationSource::Backend,
        })
    }

    /// Stream a response as fragments.
    ///
    /// Always returns a stream; if the backend cannot start streaming, the
    /// stream holds that single error.
    pub fn generate_stream(&self, prompt: &str) -> FragmentStream {
        match &self.client {
            None => mock_stream(self.mock_delay),
            Some(client) => {
                let client = Arc::clone(client);
                let prompt = prompt.to_string();

                Box::pin(async_stream::stream! {
                    match client.stream(&prompt).await {
                        Ok(mut chunks) => {
                            while let Some(chunk) = chunks.next().await {
                                let failed = chunk.is_err();
                                yield chunk;
                                if failed {
                                    break;
                                }
                            }
                        }
                        Err(e) => {
                            tracing::error!("Failed to start generation stream: {}", e);
                            yield Err(e);
                        }
                    }
                })
            }
        }
    }
}

impl std::fmt::Debug for GenerationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationAdapter")
            .field("model", &self.model_name())
            .field("mock_delay", &self.mock_delay)
            .finish()
    }
}

/// Each word is yielded first, then the pause runs before the next one.
fn mock_stream(delay: Duration) -> FragmentStream {
    Box::pin(async_stream::stream! {
        for word in MOCK_GREETING.split_whitespace() {
            yield Ok::<_, AppError>(format!("{} ", word));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    })
}
