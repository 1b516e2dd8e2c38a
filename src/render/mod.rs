//! Answer rendering.
//!
//! Answers arrive as Markdown fragments and are converted to HTML for the
//! view. Raw HTML inside an answer is governed by [`RawHtmlPolicy`].

mod markdown;

pub use markdown::{MarkdownRenderer, RawHtmlPolicy};
