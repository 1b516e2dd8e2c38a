//! HTTP client for the chat backend.

use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

use crate::error::{Result, WidgetError};

use super::{AnswerStream, ChatBackend, StreamEvent};

/// Default sentinel payload that terminates an answer stream.
pub const DEFAULT_END_MARKER: &str = "[DONE]";

/// Body of `POST /api/refresh_session`.
#[derive(Debug, Deserialize)]
struct RefreshSessionResponse {
    session_id: String,
}

/// Chat backend reached over HTTP.
///
/// # Example
///
/// ```rust,no_run
/// use sse_chat_widget::backend::{ChatBackend, HttpBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = HttpBackend::new("http://127.0.0.1:5000")?;
/// let session_id = backend.refresh_session().await?;
/// let stream = backend.open_stream(&session_id, "Hello!").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    http: reqwest::Client,
    end_marker: String,
}

impl HttpBackend {
    /// Create a backend client for `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a backend client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            http,
            end_marker: DEFAULT_END_MARKER.to_string(),
        })
    }

    /// Override the end-of-stream sentinel.
    #[must_use]
    pub fn with_end_marker(mut self, end_marker: impl Into<String>) -> Self {
        self.end_marker = end_marker.into();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the answer stream for a question.
    pub fn stream_url(&self, session_id: &str, question: &str) -> Result<Url> {
        let mut url = self.url("api/stream")?;
        url.query_pairs_mut()
            .append_pair("session_id", session_id)
            .append_pair("question", question);
        Ok(url)
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".into());
        Err(WidgetError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait::async_trait]
impl ChatBackend for HttpBackend {
    async fn refresh_session(&self) -> Result<String> {
        let response = self.http.post(self.url("api/refresh_session")?).send().await?;
        let body: RefreshSessionResponse = Self::check_status(response).await?.json().await?;
        Ok(body.session_id)
    }

    async fn open_stream(&self, session_id: &str, question: &str) -> Result<AnswerStream> {
        let url = self.stream_url(session_id, question)?;
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let end_marker = self.end_marker.clone();
        let events = response.bytes_stream().eventsource();

        let out = async_stream::stream! {
            futures::pin_mut!(events);
            while let Some(event) = events.next().await {
                match event {
                    Ok(event) if event.data == end_marker => {
                        yield Ok(StreamEvent::Done);
                        return;
                    }
                    Ok(event) => yield Ok(StreamEvent::Chunk(event.data)),
                    Err(e) => {
                        yield Err(WidgetError::Stream(e.to_string()));
                        return;
                    }
                }
            }
            yield Err(WidgetError::StreamClosed);
        };

        Ok(Box::pin(out))
    }

    async fn health(&self) -> Result<()> {
        let response = self.http.get(self.url("test")?).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
