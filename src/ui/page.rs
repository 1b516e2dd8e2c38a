//! Full page shell for the widget.

use html_escape::encode_text;

use super::view::render_widget;
use crate::chat::WidgetSnapshot;
use crate::render::MarkdownRenderer;

pub const PAGE_TITLE: &str = "Generative AI ChatBot with Streaming Response";

/// Generate the HTML shell around `content`.
fn html_shell(title: &str, content: &str) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Streaming chat widget">
    <title>{title}</title>

    <!-- HTMX and SSE extension -->
    <script src="https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js"></script>
    <script src="https://unpkg.com/htmx-ext-sse@2.2.2/sse.js"></script>
</head>
<body class="bg-gray-50">
    <div class="flex flex-col h-screen bg-gray-50">
        <header class="p-8">
            <h1 class="text-2xl font-bold mb-4 text-gray-600">{title}</h1>
            <hr class="border-t border-gray-300 mb-2">
        </header>
        {content}
    </div>
    <script>{WIDGET_SCRIPT}</script>
</body>
</html>"#)
}

/// Render the complete chat page.
pub fn chat_page(snapshot: &WidgetSnapshot, markdown: &MarkdownRenderer) -> String {
    let content = format!(
        r##"<div class="flex flex-col flex-grow pb-4 pr-8 pl-8">
            <div class="max-w-7xl">
                <div class="mb-2">
                    <h2 class="text-lg font-bold text-blue-500 pt-4 pb-2 flex">Enter Your Question</h2>
                    <form id="question-form" class="flex space-x-2 items-start"
                        hx-post="/widget/submit"
                        hx-trigger="submit"
                        hx-swap="none">
                        <textarea name="question" id="question" rows="1" style="height: 80px"
                            hx-post="/widget/draft"
                            hx-trigger="change"
                            hx-swap="none"
                            class="mt-1 block w-full pl-3 pr-3 py-2 border border-gray-300 rounded-md shadow-sm resize-none">{draft}</textarea>
                        <button type="submit" style="height: 80px"
                            class="mt-1 mb-4 inline-flex justify-center items-center py-2 px-4 rounded-md text-white bg-blue-500">Submit</button>
                    </form>
                </div>
                <div class="mb-2">
                    <h2 class="text-lg font-bold text-blue-500 pt-4 pb-2 flex items-center justify-between">
                        <span>Chat History</span>
                        <button type="button" id="new-chat" title="New chat" class="p-2 text-blue-500"
                            hx-post="/widget/new-chat"
                            hx-target="#widget-root"
                            hx-swap="innerHTML">&#128465;</button>
                    </h2>
                    <div id="widget-root" hx-ext="sse" sse-connect="/widget/events" sse-swap="view">
{widget}
                    </div>
                </div>
            </div>
        </div>"##,
        draft = encode_text(&snapshot.state.draft),
        widget = render_widget(snapshot, markdown),
    );
    html_shell(PAGE_TITLE, &content)
}

/// Keeps the input in step with the widget and the newest entry in view.
///
/// Any idle fragment carries the authoritative input text, so a stream that
/// started and finished between two pushes still clears the input.
const WIDGET_SCRIPT: &str = r#"
(function () {
    const input = document.getElementById('question');

    function settle() {
        const widget = document.getElementById('chat-widget');
        if (!widget) return;
        if (widget.dataset.streaming !== 'true') {
            input.value = widget.dataset.draft;
        }
        const end = document.getElementById('chat-end');
        if (end) end.scrollIntoView({ behavior: 'smooth' });
    }

    document.body.addEventListener('htmx:sseMessage', settle);
    document.body.addEventListener('htmx:afterSwap', settle);
    document.body.addEventListener('htmx:responseError', function (event) {
        console.error('Request rejected:', event.detail.xhr.status, event.detail.xhr.responseText);
    });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::WidgetState;

    #[test]
    fn test_chat_page_contains_widget() {
        let snapshot = WidgetSnapshot {
            state: WidgetState {
                draft: "a < b".to_string(),
                ..Default::default()
            },
            session_id: Some("abc123".to_string()),
            revision: 0,
        };
        let html = chat_page(&snapshot, &MarkdownRenderer::default());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(PAGE_TITLE));
        assert!(html.contains("Enter Your Question"));
        assert!(html.contains("Chat History"));
        assert!(html.contains(r#"id="chat-widget""#));
        assert!(html.contains("a &lt; b</textarea>"));
        assert!(html.contains(r#"sse-connect="/widget/events" sse-swap="view""#));
        assert!(html.contains(r#"hx-post="/widget/new-chat""#));
    }

    #[test]
    fn test_idle_fragment_applies_input_text() {
        // The input is written from every idle push, not only on a
        // streaming-to-idle transition the client may never see.
        assert!(WIDGET_SCRIPT.contains("if (widget.dataset.streaming !== 'true') {"));
        assert!(WIDGET_SCRIPT.contains("input.value = widget.dataset.draft;"));
        assert!(!WIDGET_SCRIPT.contains("streaming &&"));
    }
}
