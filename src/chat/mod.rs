//! Chat history and answer streaming.
//!
//! Per submission the widget moves `idle -> streaming -> idle`: a placeholder
//! entry is appended, chunks accumulate into the display buffer, and the end
//! marker commits the accumulated answer to the entry.
//!
//! - [`ChatHistory`] / [`ChatEntry`]: question/answer pairs
//! - [`WidgetState`]: history, display buffer, input draft and activity
//! - [`StreamController`]: exclusive owner of the in-flight stream

mod controller;
mod history;
mod state;

pub use controller::{StreamController, StreamHandle, StreamOutcome, WidgetSnapshot};
pub use history::{ChatEntry, ChatHistory};
pub use state::{Activity, WidgetState};
