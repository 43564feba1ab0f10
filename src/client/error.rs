//! Transport error types

use thiserror::Error;

/// Transport-layer failure, classified per operation.
///
/// These are expected-at-runtime conditions (the service may be down or
/// misbehaving) and are returned as values, never panicked on.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failure, timeout, or other request-level error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upload rejected, or its 2xx body was not valid document metadata
    #[error("upload failed (HTTP {status}): {message}")]
    UploadFailed { status: u16, message: String },

    /// Chat request rejected with a non-2xx status
    #[error("chat request failed (HTTP {status}): {message}")]
    ConverseFailed { status: u16, message: String },

    /// Chat reply was 2xx but its body fit no recognized shape
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// Reset rejected with a non-2xx status
    #[error("reset failed (HTTP {status}): {message}")]
    ResetFailed { status: u16, message: String },
}
