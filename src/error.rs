//! Transport-level error types.
//!
//! This module provides [`TransportError`], the error type for every fallible
//! operation in this crate. Construction failures surface as
//! [`TransportError::Config`]; everything else comes out of
//! [`flush`](crate::HttpBufferedTransport::flush).

use http::StatusCode;

/// Boxed error used to carry failures out of an [`HttpSend`](crate::HttpSend)
/// implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the buffered HTTP transport.
///
/// None of these are retried internally. A failed flush always leaves the
/// outbound buffer empty, so the caller may retry the whole call (fresh
/// `write`/`flush` cycle) without manual recovery.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport or its HTTP client was misconfigured (missing HTTP
    /// client, invalid path, unusable base URL). Surfaced at construction,
    /// never from I/O.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP exchange completed but returned a status other than 200 OK.
    #[error("unexpected HTTP status: {0}")]
    UnexpectedStatus(StatusCode),

    /// The HTTP-send capability failed before any status was obtained
    /// (connectivity, TLS, client-side validation, cancellation).
    #[error("transport failure: {0}")]
    Failure(#[source] BoxError),
}

impl TransportError {
    pub(crate) fn config<S: Into<String>>(message: S) -> Self {
        TransportError::Config(message.into())
    }

    pub(crate) fn failure<E: Into<BoxError>>(cause: E) -> Self {
        TransportError::Failure(cause.into())
    }

    /// The HTTP status carried by the error, if the exchange got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::UnexpectedStatus(status) => Some(*status),
            _ => None,
        }
    }

    /// Returns whether retrying the whole call might succeed.
    ///
    /// Server-side statuses and transport failures are transient candidates
    /// for a caller-level retry; configuration errors and client-side
    /// statuses are not. Nothing is retried by the transport itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Config(_) => false,
            TransportError::UnexpectedStatus(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            TransportError::Failure(_) => true,
        }
    }
}
