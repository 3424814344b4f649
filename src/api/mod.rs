//! Boundary helpers for a chat surface.
//!
//! The crate ships no router. These are the pieces an HTTP layer needs to put
//! [`RagService`] behind the two chat endpoints:
//!
//! - `POST /chat/rag` - [`answer_request`], JSON [`ChatResponse`]
//! - `POST /chat/rag/stream` - [`stream_request`], server-sent events
//!
//! Both reject a blank question with `400 {"error": "Question is required"}`
//! through [`AppError`]'s `IntoResponse`.

pub mod sse;

use crate::rag::service::RagService;
use crate::types::{AppError, Result};
use axum::response::sse::{Event, Sse};
use futures::Stream;
use std::convert::Infallible;

pub use crate::types::{ChatRequest, ChatResponse};

/// Reject empty or whitespace-only questions.
pub fn validate_question(question: &str) -> Result<&str> {
    if question.trim().is_empty() {
        return Err(AppError::InvalidInput("Question is required".to_string()));
    }
    Ok(question)
}

/// Whole-response chat exchange.
pub async fn answer_request(service: &RagService, request: ChatRequest) -> Result<ChatResponse> {
    let question = validate_question(&request.question)?;
    Ok(ChatResponse {
        answer: service.get_answer(question).await,
    })
}

/// Streaming chat exchange.
pub fn stream_request(
    service: &RagService,
    request: ChatRequest,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>> + Send>> {
    let question = validate_question(&request.question)?;
    Ok(sse::answer_sse(service.stream_answer(question)))
}
