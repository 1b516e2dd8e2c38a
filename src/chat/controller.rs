//! Stream controller: drives one answer stream at a time into the widget state.

use std::sync::{Arc, RwLock};

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::state::WidgetState;
use crate::backend::{ChatBackend, StreamEvent};
use crate::error::{Result, WidgetError};
use crate::session::SessionContext;

/// State plus session id, as seen by the view.
#[derive(Debug, Clone)]
pub struct WidgetSnapshot {
    pub state: WidgetState,
    pub session_id: Option<String>,
    /// Monotonic change counter.
    pub revision: u64,
}

/// How a submitted stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// End marker received; `answer` was committed to history.
    Completed { answer: String },
    /// Transport failure; `partial` was only ever shown, never committed.
    Failed { partial: String, error: String },
}

/// Handle to a running stream task.
#[derive(Debug)]
pub struct StreamHandle {
    pub request_id: Uuid,
    task: JoinHandle<StreamOutcome>,
}

impl StreamHandle {
    /// Wait for the stream to finish.
    pub async fn join(self) -> StreamOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => StreamOutcome::Failed {
                partial: String::new(),
                error: e.to_string(),
            },
        }
    }
}

/// Owns the widget state and the single in-flight answer stream.
///
/// The in-flight slot is exclusive: [`submit`](Self::submit) while a stream is
/// running fails with [`WidgetError::StreamInFlight`] and leaves the history
/// untouched.
#[derive(Clone)]
pub struct StreamController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    backend: Arc<dyn ChatBackend>,
    session: SessionContext,
    state: RwLock<WidgetState>,
    revision: watch::Sender<u64>,
}

impl std::fmt::Debug for StreamController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamController")
            .field("session", &self.inner.session)
            .field("revision", &*self.inner.revision.borrow())
            .finish()
    }
}

impl StreamController {
    pub fn new(backend: Arc<dyn ChatBackend>, session: SessionContext) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(ControllerInner {
                backend,
                session,
                state: RwLock::new(WidgetState::default()),
                revision,
            }),
        }
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            state: self.inner.state.read().unwrap().clone(),
            session_id: self.inner.session.current(),
            revision: *self.inner.revision.borrow(),
        }
    }

    /// Receiver that changes whenever the widget state does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Mirror the question input.
    pub fn set_draft(&self, draft: impl Into<String>) {
        let draft = draft.into();
        self.update(|state| state.draft = draft);
    }

    /// Acquire the session at startup. Failures are logged and returned.
    pub async fn init_session(&self) -> Result<String> {
        let result = self.inner.session.acquire_or_create().await;
        if let Err(e) = &result {
            tracing::error!(name: "session.start.failed", error = %e, "Failed to start session");
        }
        self.notify();
        result
    }

    /// Submit a question and start streaming its answer.
    ///
    /// The placeholder entry is appended before this returns; chunks are
    /// applied by a background task.
    pub fn submit(&self, question: impl Into<String>) -> Result<StreamHandle> {
        let question = question.into();
        let session_id = self.inner.session.current().ok_or(WidgetError::NoSession)?;

        {
            let mut state = self.inner.state.write().unwrap();
            state.begin_stream(&question)?;
            state.draft.clone_from(&question);
        }
        self.notify();

        let request_id = Uuid::new_v4();
        tracing::info!(
            name: "stream.opened",
            request_id = %request_id,
            session_id = %session_id,
            question_length = question.len(),
            "Starting answer stream"
        );

        let task = tokio::spawn(self.clone().run_stream(request_id, session_id, question));
        Ok(StreamHandle { request_id, task })
    }

    /// Start a new chat: request a new session and discard the history.
    ///
    /// Rejected while a stream is in flight.
    pub async fn new_chat(&self) -> Result<String> {
        {
            let mut state = self.inner.state.write().unwrap();
            state.begin_reset()?;
        }
        self.notify();

        // Run detached so a dropped caller cannot leave the widget resetting.
        let this = self.clone();
        let task = tokio::spawn(async move {
            let result = this.inner.session.reset().await;
            this.update(|state| state.end_reset(result.is_ok()));
            result
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                self.update(|state| state.end_reset(false));
                Err(WidgetError::Stream(e.to_string()))
            }
        }
    }

    async fn run_stream(self, request_id: Uuid, session_id: String, question: String) -> StreamOutcome {
        let mut stream = match self.inner.backend.open_stream(&session_id, &question).await {
            Ok(stream) => stream,
            Err(e) => return self.fail_stream(request_id, &e, String::new()),
        };

        let mut answer = String::new();
        while let Some(event) = stream.next().await {
            match event {
                Ok(StreamEvent::Chunk(text)) => {
                    answer.push_str(&text);
                    tracing::trace!(
                        request_id = %request_id,
                        delta_length = text.len(),
                        "Answer chunk"
                    );
                    self.update(|state| state.show_partial(&answer));
                }
                Ok(StreamEvent::Done) => {
                    // Dropping the stream closes the connection.
                    drop(stream);
                    self.update(|state| state.complete_stream(&answer));
                    tracing::info!(
                        name: "stream.done",
                        request_id = %request_id,
                        answer_length = answer.len(),
                        "Stream complete"
                    );
                    return StreamOutcome::Completed { answer };
                }
                Err(e) => {
                    drop(stream);
                    return self.fail_stream(request_id, &e, answer);
                }
            }
        }

        self.fail_stream(request_id, &WidgetError::StreamClosed, answer)
    }

    fn fail_stream(&self, request_id: Uuid, error: &WidgetError, partial: String) -> StreamOutcome {
        tracing::error!(
            name: "stream.error",
            request_id = %request_id,
            error = %error,
            partial_length = partial.len(),
            "Stream error"
        );
        self.update(WidgetState::fail_stream);
        StreamOutcome::Failed {
            partial,
            error: error.to_string(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut WidgetState)) {
        {
            let mut state = self.inner.state.write().unwrap();
            f(&mut state);
        }
        self.notify();
    }

    fn notify(&self) {
        self.inner.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}
