//! Persistent storage for the session identifier.

use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Storage holding the last-known session identifier.
///
/// Implementations persist exactly one value. A missing value is not an
/// error; it simply means a new session has to be requested.
#[async_trait]
pub trait SessionCache: Send + Sync + std::fmt::Debug {
    /// Read the cached identifier, if any.
    async fn load(&self) -> Result<Option<String>>;

    /// Overwrite the cached identifier.
    async fn store(&self, session_id: &str) -> Result<()>;
}

/// On-disk representation of the cache file.
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedSession {
    pub session_id: String,
    pub refreshed_at: String, // RFC3339
}

/// Session cache backed by a small JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionCache {
    path: PathBuf,
}

impl FileSessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> Result<Option<CachedSession>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<CachedSession>(&raw) {
            Ok(cached) => Ok(Some(cached)),
            Err(e) => {
                tracing::warn!(
                    name: "session.cache.corrupt",
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring unreadable session cache"
                );
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl SessionCache for FileSessionCache {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self
            .read()
            .await?
            .map(|cached| cached.session_id)
            .filter(|id| !id.is_empty()))
    }

    async fn store(&self, session_id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let cached = CachedSession {
            session_id: session_id.to_string(),
            refreshed_at: Utc::now().to_rfc3339(),
        };
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(&cached)?).await?;
        Ok(())
    }
}

/// In-process session cache.
#[derive(Debug, Default)]
pub struct MemorySessionCache {
    session_id: RwLock<Option<String>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-populated with `session_id`.
    pub fn with_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: RwLock::new(Some(session_id.into())),
        }
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.session_id.read().unwrap().clone())
    }

    async fn store(&self, session_id: &str) -> Result<()> {
        *self.session_id.write().unwrap() = Some(session_id.to_string());
        Ok(())
    }
}
