//! Explicit session context.

use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;

use crate::backend::ChatBackend;
use crate::error::Result;

use super::SessionCache;

/// Owns the session identifier for the widget.
///
/// Lifecycle: [`acquire_or_create`](Self::acquire_or_create) once at startup,
/// [`current`](Self::current) while chatting, [`reset`](Self::reset) when
/// the user starts a new chat. Clones share the same session.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    backend: Arc<dyn ChatBackend>,
    cache: Arc<dyn SessionCache>,
    current: RwLock<Option<String>>,
    /// Serializes backend refreshes so concurrent callers issue one request.
    refresh: Mutex<()>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("current", &self.current())
            .field("cache", &self.inner.cache)
            .finish()
    }
}

impl SessionContext {
    pub fn new(backend: Arc<dyn ChatBackend>, cache: Arc<dyn SessionCache>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                backend,
                cache,
                current: RwLock::new(None),
                refresh: Mutex::new(()),
            }),
        }
    }

    /// The active session identifier, if one has been acquired.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.inner.current.read().unwrap().clone()
    }

    /// Use the cached identifier, or request one from the backend if none is
    /// cached.
    pub async fn acquire_or_create(&self) -> Result<String> {
        let _refresh = self.inner.refresh.lock().await;

        if let Some(id) = self.current() {
            return Ok(id);
        }

        match self.inner.cache.load().await {
            Ok(Some(id)) => {
                tracing::info!(name: "session.restored", session_id = %id, "Using cached session");
                *self.inner.current.write().unwrap() = Some(id.clone());
                return Ok(id);
            }
            Ok(None) => {
                tracing::debug!("No cached session, requesting a new one");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session cache unreadable, requesting a new session");
            }
        }

        self.refresh_locked().await
    }

    /// Always request a new identifier and overwrite the cache.
    ///
    /// On failure the previous identifier stays active.
    pub async fn reset(&self) -> Result<String> {
        let _refresh = self.inner.refresh.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<String> {
        let id = match self.inner.backend.refresh_session().await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(name: "session.refresh.failed", error = %e, "Error during session start");
                return Err(e);
            }
        };

        *self.inner.current.write().unwrap() = Some(id.clone());

        if let Err(e) = self.inner.cache.store(&id).await {
            tracing::error!(
                name: "session.cache.write_failed",
                session_id = %id,
                error = %e,
                "Failed to persist session"
            );
            return Err(e);
        }

        tracing::info!(name: "session.refreshed", session_id = %id, "Session refreshed");
        Ok(id)
    }
}
