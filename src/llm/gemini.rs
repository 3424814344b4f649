//! Google Gemini client over the Generative Language REST API (v1beta).
//!
//! Whole responses use `:generateContent`; streaming uses
//! `:streamGenerateContent?alt=sse`, whose body is a server-sent-event feed of
//! `data: {GenerateContentResponse}` lines.

use crate::llm::client::{LLMClient, TextStream};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;

/// Header carrying the API key (keeps the key out of request URLs and logs).
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, api_base: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.api_base, self.model, method)
    }

    fn request_body(prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        })
    }

    async fn send(&self, url: &str, prompt: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::LLM(format!(
            "Gemini API error ({}): {}",
            status.as_u16(),
            api_error_message(&body)
        )))
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint("generateContent");
        let response = self.send(&url, prompt).await?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to read Gemini response: {}", e)))?;

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::LLM(format!("Malformed Gemini response: {}", e)))?;

        match parsed.text()? {
            Some(text) => Ok(text),
            None => Err(AppError::LLM("No response from Gemini".to_string())),
        }
    }

    async fn stream(&self, prompt: &str) -> Result<TextStream> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self.send(&url, prompt).await?;
        let mut bytes = Box::pin(response.bytes_stream());

        let output_stream = async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();

            'read: while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        buffer.extend_from_slice(&chunk);
                        // Only complete lines are decoded, so multi-byte
                        // characters split across chunks stay intact.
                        while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                            let line: Vec<u8> = buffer.drain(..=pos).collect();
                            match parse_sse_line(&String::from_utf8_lossy(&line)) {
                                Ok(Some(text)) => {
                                    yield Ok(text);
                                }
                                Ok(None) => {}
                                Err(e) => {
                                    buffer.clear();
                                    yield Err(e);
                                    break 'read;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        buffer.clear();
                        yield Err(AppError::LLM(format!("Gemini stream error: {}", e)));
                        break 'read;
                    }
                }
            }

            if !buffer.is_empty() {
                match parse_sse_line(&String::from_utf8_lossy(&buffer)) {
                    Ok(Some(text)) => {
                        yield Ok(text);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
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

// ============= Wire Types =============

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// Finish reasons that end a candidate normally.
const NORMAL_FINISH_REASONS: &[&str] = &["STOP", "MAX_TOKENS", "FINISH_REASON_UNSPECIFIED"];

impl Candidate {
    fn text(self) -> Result<Option<String>> {
        let text: String = self
            .content
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if !text.is_empty() {
            return Ok(Some(text));
        }
        match self.finish_reason {
            Some(reason) if !NORMAL_FINISH_REASONS.contains(&reason.as_str()) => {
                Err(AppError::LLM(format!("Gemini stopped without output: {}", reason)))
            }
            _ => Ok(None),
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate that has any.
    ///
    /// `Ok(None)` means the response carried no text (e.g. a final chunk with
    /// only a `STOP` finish reason). An error payload, a blocked prompt, or a
    /// candidate stopped for safety or recitation without text is an error.
    fn text(self) -> Result<Option<String>> {
        if let Some(error) = self.error {
            return Err(AppError::LLM(match error.code {
                Some(code) => format!("Gemini API error ({}): {}", code, error.message),
                None => format!("Gemini API error: {}", error.message),
            }));
        }
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AppError::LLM(format!("Gemini blocked the prompt: {}", reason)));
        }

        for candidate in self.candidates {
            if let Some(text) = candidate.text()? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }
}

/// Parse one SSE line. Non-data lines and empty payloads yield `Ok(None)`.
fn parse_sse_line(line: &str) -> Result<Option<String>> {
    let Some(data) = line.trim().strip_prefix("data:") else {
        return Ok(None);
    };

    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let parsed: GenerateContentResponse = serde_json::from_str(data)
        .map_err(|e| AppError::LLM(format!("Malformed Gemini stream chunk: {}", e)))?;
    parsed.text()
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_data_line() {
        let line = r#"data: {"candidates":[{"content":{"parts":[{"text":"Hello"},{"text":" there"}],"role":"model"}}]}"#;
        assert_eq!(parse_sse_line(line).unwrap(), Some("Hello there".to_string()));
    }

    #[test]
    fn test_parse_sse_ignores_non_data_lines() {
        assert_eq!(parse_sse_line("").unwrap(), None);
        assert_eq!(parse_sse_line(": keep-alive").unwrap(), None);
        assert_eq!(parse_sse_line("event: message").unwrap(), None);
        assert_eq!(parse_sse_line("data: [DONE]").unwrap(), None);
    }

    #[test]
    fn test_parse_sse_finish_chunk_without_text() {
        let line = r#"data: {"candidates":[{"finishReason":"STOP"}]}"#;
        assert_eq!(parse_sse_line(line).unwrap(), None);
    }

    #[test]
    fn test_parse_sse_max_tokens_chunk_without_text() {
        let line = r#"data: {"candidates":[{"finishReason":"MAX_TOKENS"}]}"#;
        assert_eq!(parse_sse_line(line).unwrap(), None);
    }

    #[test]
    fn test_parse_sse_error_payload() {
        let line = r#"data: {"error":{"code":500,"message":"Internal error encountered.","status":"INTERNAL"}}"#;
        match parse_sse_line(line) {
            Err(AppError::LLM(msg)) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("Internal error encountered."));
            }
            other => panic!("Expected LLM error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_sse_safety_stop_is_error() {
        for reason in ["SAFETY", "RECITATION"] {
            let line = format!(r#"data: {{"candidates":[{{"finishReason":"{}"}}]}}"#, reason);
            let err = parse_sse_line(&line).unwrap_err();
            assert!(err.to_string().contains(reason));
        }
    }

    #[test]
    fn test_parse_sse_text_with_safety_stop_keeps_text() {
        let line = r#"data: {"candidates":[{"content":{"parts":[{"text":"Partial"}]},"finishReason":"SAFETY"}]}"#;
        assert_eq!(parse_sse_line(line).unwrap(), Some("Partial".to_string()));
    }

    #[test]
    fn test_parse_sse_malformed_chunk() {
        assert!(matches!(parse_sse_line("data: {not json"), Err(AppError::LLM(_))));
    }

    #[test]
    fn test_blocked_prompt_is_error() {
        let line = r#"data: {"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let err = parse_sse_line(line).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_api_error_message_extraction() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(api_error_message(body), "Quota exceeded");
        assert_eq!(api_error_message("plain failure"), "plain failure");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new(
            "key".to_string(),
            "https://example.test/".to_string(),
            "gemini-1.5-flash".to_string(),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("generateContent"),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
