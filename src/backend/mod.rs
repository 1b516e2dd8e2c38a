//! Chat backend contract.
//!
//! The widget consumes two backend calls: session creation and a
//! server-sent-event answer stream. [`ChatBackend`] abstracts both so the
//! session context and the stream controller can be driven by the HTTP client
//! in production and by scripted backends in tests.

pub mod http;

use std::pin::Pin;

use futures::Stream;

use crate::error::Result;

pub use http::HttpBackend;

/// One decoded event of an answer stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of answer text to append.
    Chunk(String),
    /// The end marker was received.
    Done,
}

/// Stream of answer events for a single question.
pub type AnswerStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Backend consumed by the widget.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Request a fresh session identifier.
    async fn refresh_session(&self) -> Result<String>;

    /// Open the answer stream for `question` in `session_id`.
    async fn open_stream(&self, session_id: &str, question: &str) -> Result<AnswerStream>;

    /// Check that the backend is reachable.
    async fn health(&self) -> Result<()> {
        Ok(())
    }
}
