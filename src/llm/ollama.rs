use crate::llm::client::{LLMClient, TextStream};
use crate::types::{AppError, Result};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage},
    Ollama,
};

const DEFAULT_OLLAMA_PORT: u16 = 11434;

pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let (host, port) = split_base_url(&base_url)?;
        reqwest::Url::parse(&host).map_err(|e| {
            AppError::Configuration(format!("Invalid Ollama URL '{}': {}", base_url, e))
        })?;
        let client = Ollama::new(host, port);

        Ok(Self { client, model })
    }

    fn request(&self, prompt: &str) -> ChatMessageRequest {
        ChatMessageRequest::new(
            self.model.clone(),
            vec![ChatMessage::user(prompt.to_string())],
        )
    }
}

/// Split `scheme://host:port` into the `(scheme://host, port)` pair Ollama expects.
fn split_base_url(base_url: &str) -> Result<(String, u16)> {
    let invalid = |reason: &str| {
        AppError::Configuration(format!("Invalid Ollama URL '{}': {}", base_url, reason))
    };

    let (scheme, rest) = base_url
        .split_once("://")
        .ok_or_else(|| invalid("missing scheme (expected http:// or https://)"))?;

    let rest = rest.trim_end_matches('/');
    match rest.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse().map_err(|_| invalid("port is not a number"))?;
            Ok((format!("{}://{}", scheme, host), port))
        }
        None => Ok((format!("{}://{}", scheme, rest), DEFAULT_OLLAMA_PORT)),
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .send_chat_messages(self.request(prompt))
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }

    async fn stream(&self, prompt: &str) -> Result<TextStream> {
        let mut stream_response = self
            .client
            .send_chat_messages_stream(self.request(prompt))
            .await
            .map_err(|e| AppError::LLM(format!("Ollama stream error: {}", e)))?;

        let model = self.model.clone();
        let output_stream = stream! {
            while let Some(chunk_result) = stream_response.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        let content = chunk.message.content;
                        if !content.is_empty() {
                            yield Ok(content);
                        }
                    }
                    Err(e) => {
                        yield Err(AppError::LLM(format!(
                            "Ollama stream chunk error ({}): {:?}",
                            model, e
                        )));
                        break;
                    }
                }
            }
        };

        Ok(Box::new(Box::pin(output_stream)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
