//! Sink layer errors.

use thiserror::Error;

/// Errors from the time-series sink.
#[derive(Debug, Clone, Error)]
pub enum SinkWriteError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The store answered with an error status
    #[error("Store error: HTTP {status}: {body}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Query response could not be parsed
    #[error("Failed to parse query response: {0}")]
    MalformedResponse(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

/// Errors from the message bus sink.
#[derive(Debug, Clone, Error)]
pub enum BusPublishError {
    /// Connection to the broker failed
    #[error("Broker connection failed: {0}")]
    Connection(String),

    /// Publish was refused or the client is disconnected
    #[error("Publish failed: {0}")]
    Publish(String),
}
