use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::WatchStream;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::backend::{ChatBackend, HttpBackend};
use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::session::FileSessionCache;
use crate::ui::{chat_page, render_widget};

/// Start the widget host with the provided configuration.
pub async fn start_server(config: Arc<WidgetConfig>) -> anyhow::Result<()> {
    info!(
        name: "backend.config.loaded",
        base_url = %config.backend.base_url,
        session_file = %config.storage.session_file.display(),
        raw_html = ?config.render.raw_html,
        "Widget configuration loaded"
    );

    let backend = Arc::new(
        HttpBackend::new(&config.backend.base_url)?.with_end_marker(&config.backend.end_marker),
    );
    if let Err(e) = backend.health().await {
        tracing::warn!(
            name: "backend.unreachable",
            base_url = %backend.base_url(),
            error = %e,
            "Chat backend health check failed"
        );
    }

    let cache = Arc::new(FileSessionCache::new(&config.storage.session_file));
    let state = AppState::new(Arc::clone(&config), backend, cache);

    // Failure is logged; the footer keeps showing the loading placeholder.
    let _ = state.controller.init_session().await;

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let address = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        name: "server.started",
        address = %format!("http://{address}"),
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Routes of the widget host.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/widget/view", get(view_handler))
        .route("/widget/events", get(events_handler))
        .route("/widget/submit", post(submit_handler))
        .route("/widget/draft", post(draft_handler))
        .route("/widget/new-chat", post(new_chat_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Form body carrying the question input.
#[derive(Debug, Deserialize)]
struct QuestionForm {
    #[serde(default)]
    question: String,
}

/// Maps widget errors to HTTP responses.
#[derive(Debug)]
struct ApiError(WidgetError);

impl From<WidgetError> for ApiError {
    fn from(err: WidgetError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WidgetError::StreamInFlight | WidgetError::SessionResetting => StatusCode::CONFLICT,
            WidgetError::NoSession => StatusCode::SERVICE_UNAVAILABLE,
            WidgetError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        };
        (status, self.0.to_string()).into_response()
    }
}

fn fragment(state: &AppState) -> Html<String> {
    Html(render_widget(&state.controller.snapshot(), &state.markdown))
}

/// GET / - Full widget page.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(chat_page(&state.controller.snapshot(), &state.markdown))
}

/// GET /widget/view - Current widget fragment.
async fn view_handler(State(state): State<AppState>) -> Html<String> {
    fragment(&state)
}

/// POST /widget/submit - Start streaming the answer to a question.
async fn submit_handler(
    State(state): State<AppState>,
    Form(form): Form<QuestionForm>,
) -> Result<(StatusCode, Html<String>), ApiError> {
    match state.controller.submit(form.question) {
        Ok(handle) => {
            tracing::debug!(request_id = %handle.request_id, "Submission accepted");
            Ok((StatusCode::ACCEPTED, fragment(&state)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Submission rejected");
            Err(e.into())
        }
    }
}

/// POST /widget/draft - Mirror the question input.
async fn draft_handler(
    State(state): State<AppState>,
    Form(form): Form<QuestionForm>,
) -> StatusCode {
    state.controller.set_draft(form.question);
    StatusCode::NO_CONTENT
}

/// POST /widget/new-chat - Request a new session and clear the history.
async fn new_chat_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    state.controller.new_chat().await?;
    Ok(fragment(&state))
}

/// GET /widget/events - Rendered fragment on connect and after every change.
async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send> {
    let changes = WatchStream::new(state.controller.subscribe());
    let stream = changes.map(move |_| {
        Ok(Event::default()
            .event("view")
            .data(render_widget(&state.controller.snapshot(), &state.markdown)))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// GET /health - Liveness of the widget host.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
