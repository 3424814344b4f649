//! Server-sent-event framing for streamed answers.
//!
//! Each fragment becomes one unnamed `data` event (error fragments keep their
//! `ERROR: ` marker), and the stream always ends with a `done` event carrying
//! `[DONE]`.

use crate::rag::service::{AnswerStream, Fragment};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;

pub const DONE_EVENT: &str = "done";
pub const DONE_DATA: &str = "[DONE]";

/// One event before it is encoded onto the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<&'static str>,
    pub data: String,
}

impl SseFrame {
    pub fn fragment(fragment: &Fragment) -> Self {
        Self {
            event: None,
            data: fragment.to_string(),
        }
    }

    pub fn done() -> Self {
        Self {
            event: Some(DONE_EVENT),
            data: DONE_DATA.to_string(),
        }
    }

    pub fn into_event(self) -> Event {
        // Carriage returns are not allowed in SSE field values.
        let data = self.data.replace("\r\n", "\n").replace('\r', "\n");
        let event = Event::default().data(data);
        match self.event {
            Some(name) => event.event(name),
            None => event,
        }
    }
}

/// Frames for an answer stream, terminated by the done frame.
pub fn frames(answer: AnswerStream) -> impl Stream<Item = SseFrame> + Send {
    answer
        .map(|fragment| SseFrame::fragment(&fragment))
        .chain(stream::once(async { SseFrame::done() }))
}

/// An axum SSE response for an answer stream.
pub fn answer_sse(
    answer: AnswerStream,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send> {
    let events = frames(answer).map(|frame| Ok(frame.into_event()));
    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn answer(fragments: Vec<Fragment>) -> AnswerStream {
        Box::pin(stream::iter(fragments))
    }

    #[tokio::test]
    async fn test_frames_end_with_done() {
        let collected: Vec<SseFrame> = frames(answer(vec![
            Fragment::Text("Hello ".to_string()),
            Fragment::Text("there".to_string()),
        ]))
        .collect()
        .await;

        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0].data, "Hello ");
        assert_eq!(collected[0].event, None);
        assert_eq!(collected[2], SseFrame::done());
    }

    #[tokio::test]
    async fn test_error_fragment_is_marked() {
        let collected: Vec<SseFrame> =
            frames(answer(vec![Fragment::Error("LLM error: boom".to_string())]))
                .collect()
                .await;

        assert_eq!(collected[0].data, "ERROR: LLM error: boom");
        assert_eq!(collected[1].data, DONE_DATA);
    }

    #[tokio::test]
    async fn test_empty_answer_still_done() {
        let collected: Vec<SseFrame> = frames(answer(Vec::new())).collect().await;
        assert_eq!(collected, vec![SseFrame::done()]);
    }

    #[tokio::test]
    async fn test_sse_response_body() {
        let fragments = vec![Fragment::Text("Hi\r\nthere".to_string())];
        let response = answer_sse(answer(fragments)).into_response();

        assert_eq!(response.headers()["content-type"], "text/event-stream");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();

        assert!(body.contains("data: Hi\ndata: there\n"));
        assert!(body.contains("event: done"));
        assert!(body.contains("data: [DONE]"));
    }
}
