//! Error types for the NiceApe streaming client.

use thiserror::Error;

/// Stream-specific errors
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// Initial connection failure
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Unexpected connection close
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// JSON deserialization failure
    #[error("Failed to parse message: {0}")]
    MessageParse(String),

    /// WebSocket protocol error
    #[error("WebSocket protocol error: {0}")]
    Protocol(String),

    /// Not connected
    #[error("Not connected to stream server")]
    NotConnected,

    /// Send failed
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    /// Channel closed
    #[error("Internal channel closed")]
    ChannelClosed,

    /// Invalid URL
    #[error("Invalid stream URL: {0}")]
    InvalidUrl(String),

    /// Timeout
    #[error("Operation timed out")]
    Timeout,

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for StreamError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error;
        match err {
            Error::ConnectionClosed => {
                StreamError::ConnectionClosed("Connection closed normally".to_string())
            }
            Error::AlreadyClosed => StreamError::NotConnected,
            Error::Io(e) => StreamError::Io(e.to_string()),
            Error::Protocol(e) => StreamError::Protocol(e.to_string()),
            Error::Url(e) => StreamError::InvalidUrl(e.to_string()),
            Error::Http(resp) => {
                StreamError::ConnectionFailed(format!("HTTP error: {:?}", resp.status()))
            }
            Error::HttpFormat(e) => StreamError::ConnectionFailed(e.to_string()),
            other => StreamError::Protocol(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::MessageParse(err.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for StreamError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        StreamError::ChannelClosed
    }
}

/// Result type alias for stream operations
pub type StreamResult<T> = Result<T, StreamError>;
