//! Widget state and its transitions.

use super::history::{ChatEntry, ChatHistory};
use crate::error::{Result, WidgetError};

/// What the widget is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Activity {
    #[default]
    Idle,
    /// An answer stream is in flight.
    Streaming,
    /// A new session is being requested.
    Resetting,
}

/// Everything the view is rendered from, apart from the session id.
#[derive(Debug, Clone, Default)]
pub struct WidgetState {
    /// Text in the question input.
    pub draft: String,
    pub history: ChatHistory,
    /// Answer text received so far for the in-flight entry.
    pub display: String,
    pub activity: Activity,
}

impl WidgetState {
    pub fn is_streaming(&self) -> bool {
        self.activity == Activity::Streaming
    }

    /// Whether the entry at `index` is the one being streamed.
    pub fn is_in_flight(&self, index: usize) -> bool {
        self.is_streaming() && index + 1 == self.history.len()
    }

    /// `idle -> streaming`: append a placeholder entry for `question`.
    pub fn begin_stream(&mut self, question: &str) -> Result<()> {
        self.ensure_idle()?;
        self.activity = Activity::Streaming;
        self.display.clear();
        self.history.push(ChatEntry::pending(question));
        Ok(())
    }

    /// Mirror the accumulated answer into the display buffer.
    pub fn show_partial(&mut self, accumulated: &str) {
        self.display.clear();
        self.display.push_str(accumulated);
    }

    /// `streaming -> idle` on the end marker: commit the answer and clear the input.
    pub fn complete_stream(&mut self, answer: &str) {
        self.history.set_last_answer(answer);
        self.activity = Activity::Idle;
        self.draft.clear();
    }

    /// `streaming -> idle` on a transport error.
    ///
    /// The history entry keeps its empty answer; partial text stays only in
    /// the display buffer.
    pub fn fail_stream(&mut self) {
        self.activity = Activity::Idle;
    }

    /// `idle -> resetting` before a new session is requested.
    pub fn begin_reset(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.activity = Activity::Resetting;
        Ok(())
    }

    /// `resetting -> idle`; history, display and input are discarded only
    /// when the reset succeeded.
    pub fn end_reset(&mut self, succeeded: bool) {
        if succeeded {
            self.history.clear();
            self.display.clear();
            self.draft.clear();
        }
        self.activity = Activity::Idle;
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.activity {
            Activity::Idle => Ok(()),
            Activity::Streaming => Err(WidgetError::StreamInFlight),
            Activity::Resetting => Err(WidgetError::SessionResetting),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_lifecycle() {
        let mut state = WidgetState {
            draft: "hi".to_string(),
            ..Default::default()
        };

        state.begin_stream("hi").unwrap();
        assert!(state.is_streaming());
        assert!(state.is_in_flight(0));
        assert_eq!(state.history.last().unwrap().answer, "");

        state.show_partial("He");
        state.show_partial("Hello");
        assert_eq!(state.display, "Hello");
        assert_eq!(state.history.last().unwrap().answer, "");

        state.complete_stream("Hello");
        assert!(!state.is_streaming());
        assert_eq!(state.history.last().unwrap().answer, "Hello");
        assert!(state.draft.is_empty());
    }

    #[test]
    fn test_second_submission_is_rejected() {
        let mut state = WidgetState::default();
        state.begin_stream("one").unwrap();
        let err = state.begin_stream("two").unwrap_err();
        assert!(matches!(err, WidgetError::StreamInFlight));
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn test_failed_stream_keeps_empty_answer() {
        let mut state = WidgetState::default();
        state.begin_stream("hi").unwrap();
        state.show_partial("Hel");
        state.fail_stream();

        assert!(!state.is_streaming());
        assert_eq!(state.history.last().unwrap().answer, "");
        assert_eq!(state.display, "Hel");
    }

    #[test]
    fn test_reset_clears_history_only_on_success() {
        let mut state = WidgetState::default();
        state.begin_stream("hi").unwrap();
        state.complete_stream("Hello");

        state.draft = "half typed".to_string();

        state.begin_reset().unwrap();
        assert!(state.begin_stream("blocked").is_err());
        state.end_reset(false);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.draft, "half typed");

        state.begin_reset().unwrap();
        state.end_reset(true);
        assert!(state.history.is_empty());
        assert!(state.display.is_empty());
        assert!(state.draft.is_empty());
        assert_eq!(state.activity, Activity::Idle);
    }
}
