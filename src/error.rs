//! Error types for the widget.

use thiserror::Error;

/// Widget error type.
#[derive(Error, Debug)]
pub enum WidgetError {
    /// HTTP request to the chat backend failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid backend URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Body of the error response.
        message: String,
    },

    /// Session cache could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A stream is already being received.
    #[error("A stream is already in flight")]
    StreamInFlight,

    /// A new session is being requested.
    #[error("A new session is being requested")]
    SessionResetting,

    /// No session identifier has been acquired yet.
    #[error("No active session")]
    NoSession,

    /// The backend closed the event stream before the end marker.
    #[error("Stream closed before the end marker")]
    StreamClosed,

    /// The event stream could not be decoded.
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = WidgetError::Api {
            status: 401,
            message: "No active session".to_string(),
        };
        assert_eq!(err.to_string(), "API error (401): No active session");
    }
}
