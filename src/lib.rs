//! Streaming chat widget
//!
//! Collects a question, streams the answer from a chat backend over
//! server-sent events, renders it incrementally as Markdown, and keeps a
//! rolling history under a persisted session identifier.
//!
//! # Architecture
//!
//! - **Server**: Axum host serving the widget page and pushing view updates over SSE
//! - **Backend client**: reqwest + SSE consumer of the chat backend
//! - **Session**: explicit session context with a persistent cache
//! - **Chat**: widget state and the exclusive stream controller
//! - **UI**: server-rendered HTML fragments
//!
//! # Modules
//!
//! - [`backend`]: chat backend contract and HTTP client
//! - [`chat`]: history, widget state and stream controller
//! - [`config`]: CLI and layered configuration
//! - [`render`]: Markdown to HTML
//! - [`session`]: session cache and context
//! - [`ui`]: page and fragment rendering

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod backend;
pub mod chat;
pub mod config;
pub mod error;
pub mod render;
pub mod server;
pub mod session;
pub mod ui;

use std::sync::Arc;

use backend::ChatBackend;
use chat::StreamController;
use config::WidgetConfig;
use render::MarkdownRenderer;
use session::{SessionCache, SessionContext};

pub use error::{Result, WidgetError};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Widget state and the in-flight stream.
    pub controller: StreamController,
    /// Answer renderer.
    pub markdown: MarkdownRenderer,
    /// Global Configuration
    pub config: Arc<WidgetConfig>,
}

impl AppState {
    /// Wire a session context and stream controller over `backend`.
    pub fn new(
        config: Arc<WidgetConfig>,
        backend: Arc<dyn ChatBackend>,
        cache: Arc<dyn SessionCache>,
    ) -> Self {
        let session = SessionContext::new(Arc::clone(&backend), cache);
        Self {
            controller: StreamController::new(backend, session),
            markdown: MarkdownRenderer::new(config.render.raw_html),
            config,
        }
    }
}
