use thiserror::Error;

/// Errors produced by the network layer.
#[derive(Error, Debug)]
pub enum NetError {
    /// Transport-level HTTP failure (DNS, TCP, TLS, timeout).
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{operation} failed with status {status}")]
    Status {
        operation: &'static str,
        status: reqwest::StatusCode,
    },

    /// WebSocket transport failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Neither the primary nor the fallback realtime endpoint accepted
    /// the connection.
    #[error("Could not connect to {primary} or fallback {fallback}")]
    ConnectFailed { primary: String, fallback: String },

    /// Wire (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetError>;
