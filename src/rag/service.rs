//! RAG orchestration: retrieve, assemble, generate, normalize.
//!
//! [`RagService`] is the only entry point the chat surface needs. Both public
//! operations report failures in-band: [`RagService::get_answer`] returns an
//! apology sentence, and [`RagService::stream_answer`] ends with a single
//! [`Fragment::Error`]. [`RagService::answer`] is the structured form for
//! callers that want the error itself.

use crate::intents::IntentTable;
use crate::llm::adapter::{GenerationAdapter, GenerationSource};
use crate::rag::index::TextIndex;
use crate::rag::normalize::TextNormalizer;
use crate::rag::prompt::{Prompt, PromptAssembler, DEFAULT_PERSONA};
use crate::rag::retriever::{ContextRetriever, DEFAULT_TOP_K};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{OceanConfig, ProviderConfig};
use futures::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use tracing::Instrument;

/// Prefix marking an error fragment on the wire.
pub const ERROR_MARKER: &str = "ERROR: ";

/// One piece of a streamed answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Error(String),
}

impl Fragment {
    pub fn is_error(&self) -> bool {
        matches!(self, Fragment::Error(_))
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Text(text) => f.write_str(text),
            Fragment::Error(detail) => write!(f, "{}{}", ERROR_MARKER, detail),
        }
    }
}

pub type AnswerStream = Pin<Box<dyn Stream<Item = Fragment> + Send>>;

/// Outcome of one whole-response request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReport {
    pub answer: String,
    pub intent: String,
    pub context_documents: usize,
    pub source: GenerationSource,
}

/// Text returned by [`RagService::get_answer`] when answering fails.
pub fn apology(error: &AppError) -> String {
    format!("Sorry, I encountered an error: {}.", error)
}

#[derive(Clone)]
pub struct RagService {
    retriever: ContextRetriever,
    assembler: PromptAssembler,
    generator: GenerationAdapter,
    normalizer: TextNormalizer,
    top_k: usize,
}

impl RagService {
    pub fn builder() -> RagServiceBuilder {
        RagServiceBuilder::default()
    }

    /// Wire a service from configuration around an existing index.
    ///
    /// With no usable credential the service starts in mock mode and says so
    /// once, here.
    pub async fn from_config(config: &OceanConfig, index: Arc<dyn TextIndex>) -> Result<Self> {
        let provider = config.llm.provider.resolve();
        if provider.is_none() {
            match &config.llm.provider {
                ProviderConfig::Gemini { api_key_env, .. } => tracing::warn!(
                    "{} is not set; generation backend disabled, answering in mock mode",
                    api_key_env
                ),
                other => tracing::warn!(
                    "{} provider unavailable; answering in mock mode",
                    other.name()
                ),
            }
        }

        let generator = GenerationAdapter::from_provider(provider.as_ref())
            .await?
            .with_mock_delay(config.mock_delay());

        Self::builder()
            .intents(config.intent_table()?)
            .index(index)
            .generator(generator)
            .persona(config.assistant.persona.clone())
            .top_k(config.rag.top_k)
            .build()
    }

    pub fn is_mock(&self) -> bool {
        self.generator.is_mock()
    }

    pub fn intents(&self) -> &IntentTable {
        self.assembler.intents()
    }

    /// Answer a question, returning the structured outcome.
    pub async fn answer(&self, question: &str) -> Result<AnswerReport> {
        let span = request_span();

        async {
            let (prompt, context_documents) = self.prepare(question).await?;
            let generation = self.generator.generate(&prompt.text).await?;

            tracing::info!(
                source = ?generation.source,
                context_documents,
                "Answer generated"
            );

            Ok::<_, AppError>(AnswerReport {
                answer: self.normalizer.normalize(&generation.text),
                intent: prompt.intent,
                context_documents,
                source: generation.source,
            })
        }
        .instrument(span)
        .await
    }

    /// Answer a question as one string. Never fails: errors become an apology.
    pub async fn get_answer(&self, question: &str) -> String {
        match self.answer(question).await {
            Ok(report) => report.answer,
            Err(e) => {
                tracing::error!("Failed to answer question: {}", e);
                apology(&e)
            }
        }
    }

    /// Answer a question as a stream of normalized fragments.
    ///
    /// Nothing runs until the stream is polled. A failure at any stage is
    /// yielded as one [`Fragment::Error`] and ends the stream; dropping the
    /// stream cancels the request.
    pub fn stream_answer(&self, question: &str) -> AnswerStream {
        let service = self.clone();
        let question = question.to_string();
        let span = request_span();

        Box::pin(async_stream::stream! {
            match service.prepare(&question).instrument(span.clone()).await {
                Err(e) => {
                    span.in_scope(|| tracing::error!("Failed to prepare answer stream: {}", e));
                    yield Fragment::Error(e.to_string());
                }
                Ok((prompt, _)) => {
                    let mut chunks = service.generator.generate_stream(&prompt.text);
                    let mut count = 0usize;

                    while let Some(chunk) = chunks.next().await {
                        match chunk {
                            Ok(text) => {
                                if text.is_empty() {
                                    continue;
                                }
                                count += 1;
                                yield Fragment::Text(service.normalizer.normalize_fragment(&text));
                            }
                            Err(e) => {
                                span.in_scope(|| tracing::error!("Answer stream failed: {}", e));
                                yield Fragment::Error(e.to_string());
                                break;
                            }
                        }
                    }

                    span.in_scope(|| tracing::debug!(fragments = count, "Answer stream finished"));
                }
            }
        })
    }

    async fn prepare(&self, question: &str) -> Result<(Prompt, usize)> {
        let context = self.retriever.retrieve(question, self.top_k).await?;
        let prompt = self.assembler.assemble(question, &context);

        tracing::Span::current().record("intent", prompt.intent.as_str());
        tracing::debug!(
            intent = %prompt.intent,
            context_documents = context.len(),
            "Prompt assembled"
        );

        Ok((prompt, context.len()))
    }
}

impl fmt::Debug for RagService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RagService")
            .field("generator", &self.generator)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

fn request_span() -> tracing::Span {
    tracing::info_span!(
        "answer",
        request_id = %uuid::Uuid::new_v4(),
        intent = tracing::field::Empty
    )
}

/// Builder for [`RagService`]. Only the index is required.
#[derive(Default)]
pub struct RagServiceBuilder {
    intents: Option<IntentTable>,
    index: Option<Arc<dyn TextIndex>>,
    generator: Option<GenerationAdapter>,
    normalizer: TextNormalizer,
    persona: Option<String>,
    top_k: Option<usize>,
}

impl RagServiceBuilder {
    pub fn intents(mut self, intents: IntentTable) -> Self {
        self.intents = Some(intents);
        self
    }

    pub fn index(mut self, index: Arc<dyn TextIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Generation adapter; mock mode when not set.
    pub fn generator(mut self, generator: GenerationAdapter) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn build(self) -> Result<RagService> {
        let index = self
            .index
            .ok_or_else(|| AppError::Configuration("RagService requires an index".to_string()))?;

        let intents = Arc::new(self.intents.unwrap_or_default());
        let persona = self.persona.unwrap_or_else(|| DEFAULT_PERSONA.to_string());

        Ok(RagService {
            retriever: ContextRetriever::new(index),
            assembler: PromptAssembler::new(intents, persona),
            generator: self.generator.unwrap_or_else(GenerationAdapter::mock),
            normalizer: self.normalizer,
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchResult;
    use async_trait::async_trait;

    struct EmptyIndex;

    #[async_trait]
    impl TextIndex for EmptyIndex {
        async fn query(&self, _text: &str, _k: usize) -> Result<Vec<SearchResult>> {
            Ok(Vec::new())
        }
    }

    fn mock_service() -> RagService {
        RagService::builder()
            .index(Arc::new(EmptyIndex))
            .generator(GenerationAdapter::mock().with_mock_delay(std::time::Duration::ZERO))
            .build()
            .unwrap()
    }

    #[test]
    fn test_fragment_display() {
        assert_eq!(Fragment::Text("Hello ".to_string()).to_string(), "Hello ");
        assert_eq!(
            Fragment::Error("LLM error: timeout".to_string()).to_string(),
            "ERROR: LLM error: timeout"
        );
        assert!(Fragment::Error(String::new()).is_error());
    }

    #[test]
    fn test_apology_format() {
        let error = AppError::LLM("quota exceeded".to_string());
        assert_eq!(
            apology(&error),
            "Sorry, I encountered an error: LLM error: quota exceeded."
        );
    }

    #[test]
    fn test_builder_requires_index() {
        assert!(matches!(
            RagService::builder().build(),
            Err(AppError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_answer_report() {
        let service = mock_service();
        assert!(service.is_mock());

        let report = service.answer("What's my balance?").await.unwrap();
        assert_eq!(report.intent, "account_balance");
        assert_eq!(report.context_documents, 0);
        assert_eq!(report.source, GenerationSource::Mock);
        assert!(report.answer.starts_with("Hello! I'm your Ocean Bank assistant."));
    }

    #[tokio::test]
    async fn test_mock_stream_concatenates_to_greeting() {
        let service = mock_service();
        let text: String = service
            .stream_answer("Hi")
            .map(|fragment| fragment.to_string())
            .collect::<Vec<_>>()
            .await
            .concat();

        assert_eq!(text.trim_end(), crate::llm::adapter::MOCK_GREETING);
    }

    #[tokio::test]
    async fn test_from_config_without_key_is_mock() {
        let mut config = OceanConfig::default();
        config.llm.provider = ProviderConfig::Gemini {
            api_key_env: "OCEAN_TEST_UNSET_GEMINI_KEY".to_string(),
            api_base: "http://localhost:1".to_string(),
            model: "gemini-1.5-flash".to_string(),
        };

        let service = RagService::from_config(&config, Arc::new(EmptyIndex))
            .await
            .unwrap();
        assert!(service.is_mock());
        assert_eq!(service.intents().len(), 6);
    }
}
