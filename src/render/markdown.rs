//! Markdown to HTML conversion for answers.

use pulldown_cmark::{CowStr, Event, Options, Parser, html};
use serde::Deserialize;

/// How raw HTML embedded in an answer is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawHtmlPolicy {
    /// Raw HTML is shown as text. `<br>` tags still become line breaks,
    /// since the backend encodes newlines that way.
    #[default]
    Escape,
    /// Raw HTML is injected as-is.
    Trust,
}

/// Converts Markdown answers to HTML fragments.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    policy: RawHtmlPolicy,
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(RawHtmlPolicy::default())
    }
}

impl MarkdownRenderer {
    #[must_use]
    pub fn new(policy: RawHtmlPolicy) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { policy, options }
    }

    /// Render a (possibly partial) Markdown document to HTML.
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() + markdown.len() / 2);
        match self.policy {
            RawHtmlPolicy::Trust => html::push_html(&mut out, parser),
            RawHtmlPolicy::Escape => html::push_html(&mut out, parser.flat_map(escape_raw_html)),
        }
        out
    }
}

fn escape_raw_html(event: Event<'_>) -> Vec<Event<'_>> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => split_line_breaks(&raw),
        other => vec![other],
    }
}

/// Split raw HTML into text runs and hard breaks for each `<br>` variant.
fn split_line_breaks(raw: &str) -> Vec<Event<'static>> {
    let lower = raw.to_ascii_lowercase();
    let mut events = Vec::new();
    let mut cursor = 0;
    let mut search = 0;

    while let Some(offset) = lower[search..].find("<br") {
        let start = search + offset;
        match br_tag_len(&lower[start..]) {
            Some(len) => {
                if start > cursor {
                    events.push(Event::Text(CowStr::from(raw[cursor..start].to_string())));
                }
                events.push(Event::HardBreak);
                cursor = start + len;
                search = cursor;
            }
            None => search = start + 3,
        }
    }

    if cursor < raw.len() {
        events.push(Event::Text(CowStr::from(raw[cursor..].to_string())));
    }
    events
}

/// Length of a `<br>`, `<br/>` or `<br />` tag at the start of `s`.
fn br_tag_len(s: &str) -> Option<usize> {
    let rest = s.strip_prefix("<br")?;
    let trimmed = rest.trim_start();
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
    trimmed.strip_prefix('>')?;
    Some(s.len() - trimmed.len() + 1)
}
