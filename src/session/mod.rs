//! Session identifier management.
//!
//! The widget talks to the backend under one opaque session identifier. The
//! identifier is persisted through a [`SessionCache`] so it survives restarts,
//! and owned at runtime by a [`SessionContext`].
//!
//! # Architecture
//!
//! - [`SessionCache`]: persistent storage for the last-known identifier
//! - [`FileSessionCache`]: JSON file implementation
//! - [`MemorySessionCache`]: in-process implementation
//! - [`SessionContext`]: acquire-or-create, use, explicit reset
//!
//! # Example
//!
//! ```rust
//! use sse_chat_widget::session::{MemorySessionCache, SessionCache};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache = MemorySessionCache::with_session("abc123");
//! assert_eq!(cache.load().await.unwrap().as_deref(), Some("abc123"));
//! # }
//! ```

mod cache;
mod context;

pub use cache::{CachedSession, FileSessionCache, MemorySessionCache, SessionCache};
pub use context::SessionContext;
