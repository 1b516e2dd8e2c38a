//! Widget fragment renderer.
//!
//! A pure function of [`WidgetSnapshot`] to HTML. The fragment is swapped
//! into the page on every state change.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::chat::{ChatEntry, WidgetSnapshot};
use crate::render::MarkdownRenderer;

/// Placeholder shown while nothing has arrived yet.
pub const LOADING: &str = "Loading...";

/// Render the history list and session footer.
pub fn render_widget(snapshot: &WidgetSnapshot, markdown: &MarkdownRenderer) -> String {
    let state = &snapshot.state;
    let mut entries = String::new();
    for (index, entry) in state.history.iter().enumerate() {
        let answer = if state.is_in_flight(index) {
            render_in_flight(&state.display, markdown)
        } else {
            format!(r#"<div class="markdown">{}</div>"#, markdown.render(&entry.answer))
        };
        entries.push_str(&render_entry(index, entry, &answer));
    }

    format!(
        r#"<section id="chat-widget" data-revision="{revision}" data-streaming="{streaming}" data-draft="{draft}">
    <div class="mt-1 border border-gray-300 rounded-md shadow-sm min-h-48 max-h-[800px] overflow-y-auto p-2 space-y-4">
        <div class="p-6 pt-8 space-y-4">
{entries}            <div id="chat-end"></div>
        </div>
    </div>
    {footer}
</section>"#,
        revision = snapshot.revision,
        streaming = state.is_streaming(),
        draft = encode_double_quoted_attribute(&state.draft),
        footer = render_session_footer(snapshot.session_id.as_deref()),
    )
}

fn render_in_flight(display: &str, markdown: &MarkdownRenderer) -> String {
    if display.is_empty() {
        format!(r#"<div class="text-gray-500 italic">{LOADING}</div>"#)
    } else {
        format!(r#"<div class="markdown">{}</div>"#, markdown.render(display))
    }
}

fn render_entry(index: usize, entry: &ChatEntry, answer: &str) -> String {
    format!(
        r#"            <div class="chat-entry mb-2" data-index="{index}">
                <div class="text-blue-600 font-semibold">You:</div>
                <div class="p-2 mt-1 bg-blue-50 rounded-md">{question}</div>
                <div class="text-gray-600 font-semibold mt-2">AI:</div>
                <div class="p-2 mt-1 bg-gray-100 rounded-md">{answer}</div>
            </div>
"#,
        question = encode_text(&entry.question),
    )
}

fn render_session_footer(session_id: Option<&str>) -> String {
    let session = session_id.map_or_else(|| LOADING.into(), encode_text);
    format!(
        r#"<div class="text-sm text-gray-300 mt-4 text-right">
        <span>Session ID: </span>
        <span class="font-mono" id="session-id">{session}</span>
    </div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{WidgetSnapshot, WidgetState};

    fn snapshot(state: WidgetState, session_id: Option<&str>) -> WidgetSnapshot {
        WidgetSnapshot {
            state,
            session_id: session_id.map(ToString::to_string),
            revision: 7,
        }
    }

    #[test]
    fn test_session_placeholder() {
        let html = render_widget(&snapshot(WidgetState::default(), None), &MarkdownRenderer::default());
        assert!(html.contains(r#"<span class="font-mono" id="session-id">Loading...</span>"#));

        let html = render_widget(
            &snapshot(WidgetState::default(), Some("abc123")),
            &MarkdownRenderer::default(),
        );
        assert!(html.contains(">abc123</span>"));
    }

    #[test]
    fn test_in_flight_entry_shows_loading_then_buffer() {
        let md = MarkdownRenderer::default();
        let mut state = WidgetState::default();
        state.begin_stream("hi").unwrap();

        let html = render_widget(&snapshot(state.clone(), Some("s")), &md);
        assert!(html.contains("Loading..."));
        assert!(html.contains(r#"data-streaming="true""#));

        state.show_partial("**He**");
        let html = render_widget(&snapshot(state, Some("s")), &md);
        assert!(html.contains("<strong>He</strong>"));
        assert!(!html.contains("italic\">Loading"));
    }

    #[test]
    fn test_completed_entries_render_answer() {
        let md = MarkdownRenderer::default();
        let mut state = WidgetState::default();
        state.begin_stream("what?").unwrap();
        state.complete_stream("*done*");

        let html = render_widget(&snapshot(state, Some("s")), &md);
        assert!(html.contains("<em>done</em>"));
        assert!(html.contains(r#"data-streaming="false""#));
    }

    #[test]
    fn test_question_is_escaped() {
        let md = MarkdownRenderer::default();
        let mut state = WidgetState::default();
        state.begin_stream("<img src=x onerror=alert(1)>").unwrap();

        let html = render_widget(&snapshot(state, Some("s")), &md);
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(!html.contains("<img"));
    }
}
